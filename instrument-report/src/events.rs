// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed events decoded from host status callbacks.
//!
//! The instrumentation host reports progress through a status code and an untyped
//! [`StatusBundle`]. [`RunEvent::decode`] turns those into the two kinds of events that the
//! [`JunitReporter`](crate::reporter::JunitReporter) understands.

use crate::{
    bundle::{
        BundleValue, REPORT_KEY_NAME_CLASS, REPORT_KEY_NAME_TEST, REPORT_KEY_NUM_CURRENT,
        REPORT_KEY_NUM_TOTAL, REPORT_KEY_STACK, StatusBundle,
    },
    errors::ProtocolError,
};
use std::fmt;

/// A status code sent by the instrumentation host for a single test.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StatusCode {
    /// A test is about to run.
    Start,

    /// A test passed.
    Ok,

    /// A test failed an assertion.
    Failure,

    /// A test threw an unexpected error.
    Error,
}

impl StatusCode {
    /// Raw code for [`StatusCode::Start`].
    pub const START: i32 = 1;

    /// Raw code for [`StatusCode::Ok`].
    pub const OK: i32 = 0;

    /// Raw code for [`StatusCode::Error`].
    pub const ERROR: i32 = -1;

    /// Raw code for [`StatusCode::Failure`].
    pub const FAILURE: i32 = -2;

    /// Maps a raw code to a status code, returning `None` for codes that do not describe a
    /// test.
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            Self::START => Some(StatusCode::Start),
            Self::OK => Some(StatusCode::Ok),
            Self::ERROR => Some(StatusCode::Error),
            Self::FAILURE => Some(StatusCode::Failure),
            _ => None,
        }
    }
}

/// The terminal status of one test.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestOutcome {
    /// The test passed.
    Ok,

    /// The test failed an assertion.
    Failure,

    /// The test threw an unexpected error.
    Error,
}

impl TestOutcome {
    /// Returns true if the test passed.
    pub fn is_success(self) -> bool {
        self == TestOutcome::Ok
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Ok => write!(f, "ok"),
            TestOutcome::Failure => write!(f, "failure"),
            TestOutcome::Error => write!(f, "error"),
        }
    }
}

/// An event in a test run, in arrival order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunEvent {
    /// A test is about to run.
    Start(TestStarted),

    /// A test finished running.
    Result(TestFinished),
}

impl RunEvent {
    /// Decodes a host status callback.
    ///
    /// Returns `Ok(None)` for status codes that do not describe a test. Names and stack text
    /// are optional; the `current` and `numtests` counters are required on results.
    pub fn decode(code: i32, bundle: &StatusBundle) -> Result<Option<Self>, ProtocolError> {
        let Some(code) = StatusCode::from_raw(code) else {
            return Ok(None);
        };

        let class_name = bundle.get_str(REPORT_KEY_NAME_CLASS).map(str::to_owned);
        let test_method = bundle.get_str(REPORT_KEY_NAME_TEST).map(str::to_owned);

        let outcome = match code {
            StatusCode::Start => {
                return Ok(Some(RunEvent::Start(TestStarted {
                    class_name,
                    test_method,
                })));
            }
            StatusCode::Ok => TestOutcome::Ok,
            StatusCode::Failure => TestOutcome::Failure,
            StatusCode::Error => TestOutcome::Error,
        };

        Ok(Some(RunEvent::Result(TestFinished {
            outcome,
            class_name,
            test_method,
            stack: bundle.get_str(REPORT_KEY_STACK).map(str::to_owned),
            current: counter(bundle, REPORT_KEY_NUM_CURRENT)?,
            total: counter(bundle, REPORT_KEY_NUM_TOTAL)?,
        })))
    }

    /// Returns a short name for the kind of event.
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::Start(_) => "start",
            RunEvent::Result(_) => "result",
        }
    }
}

/// Data carried by [`RunEvent::Start`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TestStarted {
    /// The fully qualified class name of the test.
    pub class_name: Option<String>,

    /// The test method name. Only used for diagnostics.
    pub test_method: Option<String>,
}

/// Data carried by [`RunEvent::Result`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestFinished {
    /// How the test ended.
    pub outcome: TestOutcome,

    /// The fully qualified class name of the test.
    pub class_name: Option<String>,

    /// The test method name.
    pub test_method: Option<String>,

    /// The stack trace, for tests that did not pass.
    pub stack: Option<String>,

    /// The 1-based sequence number of this test.
    pub current: u32,

    /// The total number of tests in the run.
    pub total: u32,
}

impl TestFinished {
    /// Returns true if this is the last result of the run.
    pub fn is_last(&self) -> bool {
        self.current == self.total
    }
}

fn counter(bundle: &StatusBundle, key: &'static str) -> Result<u32, ProtocolError> {
    let invalid = |value: &BundleValue| ProtocolError::InvalidField {
        key,
        value: value.to_string(),
    };

    match bundle.get(key) {
        None => Err(ProtocolError::MissingField { key }),
        Some(value @ BundleValue::Int(n)) => u32::try_from(*n).map_err(|_| invalid(value)),
        Some(value @ BundleValue::String(s)) => s.trim().parse().map_err(|_| invalid(value)),
        Some(value @ (BundleValue::Bool(_) | BundleValue::Float(_))) => Err(invalid(value)),
    }
}
