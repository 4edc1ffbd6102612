// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{InstrumentReportExitCode, output::StderrStyles};
use camino::Utf8PathBuf;
use instrument_report::errors::ReportError;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error that occurred while producing a report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to open input")]
    InputOpen {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to start main thread executor")]
    ExecutorSpawn {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to set up report")]
    ReportSetup {
        #[source]
        err: ReportError,
    },
    #[error("failed to read input")]
    InputRead {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to parse input")]
    InputParse {
        line: usize,
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to write report")]
    ReportWrite {
        path: Utf8PathBuf,
        #[source]
        err: ReportError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::InputOpen { .. } | Self::ExecutorSpawn { .. } | Self::ReportSetup { .. } => {
                InstrumentReportExitCode::SETUP_ERROR
            }
            Self::InputRead { .. } | Self::InputParse { .. } => {
                InstrumentReportExitCode::INPUT_PARSE_ERROR
            }
            Self::ReportWrite { .. } => InstrumentReportExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let (message, mut next_error) = match self {
            Self::InputOpen { path, err } => (
                format!("failed to open input `{}`", path.style(styles.bold)),
                Some(err as &dyn Error),
            ),
            Self::ExecutorSpawn { err } => (
                "failed to start main thread executor".to_owned(),
                Some(err as &dyn Error),
            ),
            Self::ReportSetup { err } => (
                "failed to set up JUnit report".to_owned(),
                Some(err as &dyn Error),
            ),
            Self::InputRead { err } => (
                "failed to read status stream".to_owned(),
                Some(err as &dyn Error),
            ),
            Self::InputParse { line, err } => (
                format!(
                    "failed to parse status stream at line {}",
                    line.style(styles.bold)
                ),
                Some(err as &dyn Error),
            ),
            Self::ReportWrite { path, err } => (
                format!("failed to write JUnit report to `{}`", path.style(styles.bold)),
                Some(err as &dyn Error),
            ),
        };

        eprintln!("{}: {message}", "error".style(styles.error));
        while let Some(err) = next_error {
            eprintln!("  caused by: {err}");
            next_error = err.source();
        }
    }
}
