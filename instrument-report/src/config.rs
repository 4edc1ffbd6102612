// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run arguments supplied by the host at the start of a run.

use crate::bundle::StatusBundle;
use camino::{Utf8Path, Utf8PathBuf};

/// The file name used for the report when none is specified.
pub const DEFAULT_REPORT_FILE_NAME: &str = "junit-report.xml";

/// Argument key for the report file name.
pub const ARG_OUTFILE: &str = "outfile";

/// Argument key for disabling usage tracking.
pub const ARG_DISABLE_ANALYTICS: &str = "disableAnalytics";

/// Arguments that configure a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunArguments {
    /// The file name of the report, relative to the output directory.
    pub outfile: String,

    /// If true, no usage data is tracked or sent.
    pub disable_analytics: bool,
}

impl RunArguments {
    /// Reads arguments from the bundle passed at the start of a run.
    ///
    /// Missing or mistyped values fall back to their defaults. An empty `outfile` is treated as
    /// missing.
    pub fn from_bundle(bundle: &StatusBundle) -> Self {
        let outfile = bundle
            .get_str(ARG_OUTFILE)
            .filter(|outfile| !outfile.is_empty())
            .unwrap_or(DEFAULT_REPORT_FILE_NAME)
            .to_owned();

        Self {
            outfile,
            disable_analytics: bundle.get_flag(ARG_DISABLE_ANALYTICS),
        }
    }

    /// Returns the path of the report within `output_dir`.
    pub fn report_path(&self, output_dir: &Utf8Path) -> Utf8PathBuf {
        output_dir.join(&self.outfile)
    }
}

impl Default for RunArguments {
    fn default() -> Self {
        Self {
            outfile: DEFAULT_REPORT_FILE_NAME.to_owned(),
            disable_analytics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        assert_eq!(
            RunArguments::from_bundle(&StatusBundle::new()),
            RunArguments::default()
        );

        let bundle: StatusBundle = [
            (ARG_OUTFILE, BundleValue::from("")),
            (ARG_DISABLE_ANALYTICS, BundleValue::from(1i64)),
        ]
        .into_iter()
        .collect();
        assert_eq!(RunArguments::from_bundle(&bundle), RunArguments::default());
    }

    #[test]
    fn explicit_values() {
        let bundle: StatusBundle = [
            (ARG_OUTFILE, BundleValue::from("results/report.xml")),
            (ARG_DISABLE_ANALYTICS, BundleValue::from("TRUE")),
        ]
        .into_iter()
        .collect();
        let arguments = RunArguments::from_bundle(&bundle);

        assert_eq!(arguments.outfile, "results/report.xml");
        assert!(arguments.disable_analytics);
        assert_eq!(
            arguments.report_path(Utf8Path::new("/sdcard/files")),
            Utf8PathBuf::from("/sdcard/files/results/report.xml")
        );
    }
}
