// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::bundle::StatusBundle;
use camino::Utf8PathBuf;

/// The instrumentation host that runs tests and receives their status.
///
/// The host owns test discovery, execution and the transport back to whoever launched the run.
/// [`RunController`](super::RunController) observes the status stream on its way through and
/// hands every callback back to the host unchanged.
pub trait InstrumentationHost {
    /// Returns the external files directory, if the host has one.
    fn external_files_dir(&self) -> Option<Utf8PathBuf>;

    /// Returns the internal files directory. Used when there is no external files directory.
    fn files_dir(&self) -> Utf8PathBuf;

    /// Delivers a status callback.
    fn send_status(&mut self, code: i32, fields: &StatusBundle);

    /// Ends the run.
    fn finish(&mut self, result_code: i32, fields: &StatusBundle);
}

/// Cleans up activities left over from the previous test.
///
/// Run through the host's [`MainThreadExecutor`](super::MainThreadExecutor) before each test
/// starts.
pub trait ActivityFinisher: Send + Sync + 'static {
    /// Finishes all open activities.
    fn finish_activities(&self);
}
