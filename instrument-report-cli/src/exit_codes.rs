// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `instrument-report` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum InstrumentReportExitCode {}

impl InstrumentReportExitCode {
    /// No errors occurred and the report was written.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up the run, for example the input or the report file
    /// could not be opened.
    pub const SETUP_ERROR: i32 = 96;

    /// The status stream could not be read or parsed.
    pub const INPUT_PARSE_ERROR: i32 = 97;

    /// Writing the report failed partway through the run.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
