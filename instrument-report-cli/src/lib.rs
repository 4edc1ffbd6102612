// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line host for `instrument-report`.
//!
//! Replays a recorded instrumentation status stream, one JSON object per line, through a
//! [`RunController`](instrument_report::controller::RunController) to produce a JUnit report
//! outside of a device.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod host;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::InstrumentReportExitCode;
