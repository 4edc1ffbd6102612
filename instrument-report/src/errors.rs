// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while building a report.

use crate::reporter::ReportPhase;
use camino::Utf8PathBuf;
use junit_stream::WriteError;
use std::fmt;
use thiserror::Error;

/// An error that occurred while turning status events into a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// The report output could not be created.
    #[error("error creating report output at `{path}`")]
    Create {
        /// The path that was being created.
        path: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// Writing to the report output failed.
    ///
    /// This is not recoverable for the current report.
    #[error("error writing JUnit report")]
    Write(#[source] WriteError),

    /// The host sent an event that does not fit the current state of the run.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The report was mutated in a phase that does not allow it.
    #[error(transparent)]
    State(#[from] XmlStateError),
}

impl ReportError {
    /// Returns true if the run can continue reporting after this error.
    ///
    /// Only protocol errors are recoverable: the offending event is skipped and the partial
    /// report is left intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::Protocol(_))
    }
}

impl From<WriteError> for ReportError {
    fn from(error: WriteError) -> Self {
        ReportError::Write(error)
    }
}

/// An event arrived that the report cannot account for.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A result was received without a preceding start.
    #[error(
        "received result for {} without a matching start",
        display_test_name(.class_name, .test_method)
    )]
    ResultWithoutStart {
        /// The class name carried by the result, if any.
        class_name: Option<String>,

        /// The method name carried by the result, if any.
        test_method: Option<String>,
    },

    /// An event was received after the report was closed.
    #[error("received {kind} event after the report was closed")]
    EventAfterClose {
        /// The kind of event that was received.
        kind: &'static str,
    },

    /// A required field was missing from a status bundle.
    #[error("status bundle is missing required field `{key}`")]
    MissingField {
        /// The bundle key.
        key: &'static str,
    },

    /// A field in a status bundle had an unusable value.
    #[error("status bundle field `{key}` has invalid value `{value}`")]
    InvalidField {
        /// The bundle key.
        key: &'static str,

        /// The value, as displayed.
        value: String,
    },
}

/// The report was asked to do something its current phase does not allow.
///
/// This indicates that the report was driven incorrectly, not that the host misbehaved.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot {operation} while the report is {phase}")]
pub struct XmlStateError {
    operation: &'static str,
    phase: ReportPhase,
}

impl XmlStateError {
    pub(crate) fn new(operation: &'static str, phase: ReportPhase) -> Self {
        Self { operation, phase }
    }

    /// Returns the phase the report was in.
    pub fn phase(&self) -> ReportPhase {
        self.phase
    }
}

/// An error returned by a [`UsageTracker`](crate::usage::UsageTracker) while sending usages.
#[derive(Debug, Error)]
#[error("failed to send usage data")]
pub struct UsageError {
    #[source]
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl UsageError {
    /// Wraps an error produced by a usage-tracking backend.
    pub fn new(inner: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            inner: inner.into(),
        }
    }
}

/// Displays an error along with its chain of sources, on a single line.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: std::error::Error> DisplayErrorChain<E> {
    /// Wraps an error for display.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: std::error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, ": {error}")?;
            source = error.source();
        }
        Ok(())
    }
}

fn display_test_name<'a>(
    class_name: &'a Option<String>,
    test_method: &'a Option<String>,
) -> DisplayTestName<'a> {
    DisplayTestName {
        class_name: class_name.as_deref(),
        test_method: test_method.as_deref(),
    }
}

struct DisplayTestName<'a> {
    class_name: Option<&'a str>,
    test_method: Option<&'a str>,
}

impl fmt::Display for DisplayTestName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.class_name, self.test_method) {
            (Some(class_name), Some(test_method)) => write!(f, "{class_name}#{test_method}"),
            (Some(class_name), None) => write!(f, "{class_name}"),
            (None, Some(test_method)) => write!(f, "#{test_method}"),
            (None, None) => write!(f, "unnamed test"),
        }
    }
}
