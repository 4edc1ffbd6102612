// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stopwatch for tracking how long each test takes.
//!
//! The start time is recorded with both a `DateTime` (realtime clock, for logging) and an
//! `Instant` (monotonic clock). Elapsed durations are always computed from the monotonic clock.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

pub(crate) fn stopwatch() -> StopwatchStart {
    StopwatchStart::new()
}

/// The start state of a stopwatch.
#[derive(Clone, Debug)]
pub(crate) struct StopwatchStart {
    start_time: DateTime<Local>,
    instant: Instant,
}

impl StopwatchStart {
    fn new() -> Self {
        Self {
            // These two syscalls will happen imperceptibly close to each other, which is good
            // enough for our purposes.
            start_time: Local::now(),
            instant: Instant::now(),
        }
    }

    pub(crate) fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub(crate) fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            start_time: self.start_time,
            duration: self.instant.elapsed(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct StopwatchSnapshot {
    pub(crate) start_time: DateTime<Local>,
    pub(crate) duration: Duration,
}

impl StopwatchSnapshot {
    /// Formats the duration as seconds with 3 decimal places, the way JUnit reports expect.
    pub(crate) fn junit_time(&self) -> String {
        format!("{:.3}", self.duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_monotonic() {
        let start = stopwatch();
        std::thread::sleep(Duration::from_millis(20));
        let first = start.snapshot();
        let second = start.snapshot();

        assert_eq!(first.start_time, start.start_time());
        assert!(first.duration >= Duration::from_millis(20));
        assert!(second.duration >= first.duration);
    }

    #[test]
    fn junit_time_format() {
        let snapshot = StopwatchSnapshot {
            start_time: Local::now(),
            duration: Duration::from_millis(1234),
        };
        assert_eq!(snapshot.junit_time(), "1.234");

        let snapshot = StopwatchSnapshot {
            start_time: Local::now(),
            duration: Duration::from_micros(1600),
        };
        assert_eq!(snapshot.junit_time(), "0.002");

        let snapshot = StopwatchSnapshot {
            start_time: Local::now(),
            duration: Duration::ZERO,
        };
        assert_eq!(snapshot.junit_time(), "0.000");
    }
}
