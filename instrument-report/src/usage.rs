// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage tracking.
//!
//! Backends are provided by the embedding host. The run controller only records which runner
//! was used and asks the tracker to send its data once the run finishes.

use crate::errors::UsageError;

/// The usage name recorded for every run.
pub const TEST_RUNNER_USAGE: &str = "TestRunner";

/// A sink for usage data.
pub trait UsageTracker: Send {
    /// Records that a feature was used.
    fn track_usage(&mut self, usage: &str);

    /// Sends all recorded usages.
    fn send_usages(&mut self) -> Result<(), UsageError>;
}

/// A [`UsageTracker`] that discards everything.
///
/// Used when analytics are disabled, and when the host does not provide a tracker.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUsageTracker;

impl UsageTracker for NoopUsageTracker {
    fn track_usage(&mut self, _usage: &str) {}

    fn send_usages(&mut self) -> Result<(), UsageError> {
        Ok(())
    }
}
