// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use instrument_report::{bundle::StatusBundle, controller::InstrumentationHost};
use serde::Deserialize;
use tracing::{debug, info};

/// One line of a recorded status stream.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub(crate) enum StatusRecord {
    /// A status callback.
    Status {
        code: i32,
        #[serde(default)]
        fields: StatusBundle,
    },

    /// The end of the run.
    Finish {
        #[serde(default)]
        code: i32,
        #[serde(default)]
        fields: StatusBundle,
    },
}

/// An instrumentation host backed by a recorded stream.
///
/// Output directories come from the command line. Forwarded callbacks are logged and counted.
#[derive(Debug)]
pub(crate) struct StreamHost {
    files_dir: Utf8PathBuf,
    external_files_dir: Option<Utf8PathBuf>,
    statuses_forwarded: usize,
    result_code: Option<i32>,
}

impl StreamHost {
    pub(crate) fn new(files_dir: Utf8PathBuf, external_files_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            files_dir,
            external_files_dir,
            statuses_forwarded: 0,
            result_code: None,
        }
    }

    pub(crate) fn result_code(&self) -> Option<i32> {
        self.result_code
    }
}

impl InstrumentationHost for StreamHost {
    fn external_files_dir(&self) -> Option<Utf8PathBuf> {
        self.external_files_dir.clone()
    }

    fn files_dir(&self) -> Utf8PathBuf {
        self.files_dir.clone()
    }

    fn send_status(&mut self, code: i32, fields: &StatusBundle) {
        self.statuses_forwarded += 1;
        debug!(code, fields = fields.len(), "status forwarded");
    }

    fn finish(&mut self, result_code: i32, _fields: &StatusBundle) {
        self.result_code = Some(result_code);
        info!(
            result_code,
            statuses = self.statuses_forwarded,
            "instrumentation finished"
        );
    }
}
