// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, InstrumentReportExitCode, Result,
    host::{StatusRecord, StreamHost},
    output::{OutputContext, OutputOpts},
};
use camino::Utf8PathBuf;
use clap::Parser;
use instrument_report::{
    bundle::StatusBundle,
    controller::{RunController, RunControllerBuilder, WorkerThreadExecutor},
    errors::ReportError,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
};
use tracing::{info, warn};

/// Writes a JUnit XML report from a recorded instrumentation status stream.
///
/// The stream is read one JSON object per line. Each line is either a status callback,
/// `{"event":"status","code":1,"fields":{...}}`, or the end of the run,
/// `{"event":"finish","code":-1,"fields":{...}}`.
#[derive(Debug, Parser)]
#[command(
    name = "instrument-report",
    version,
    styles = crate::output::clap_styles::style(),
)]
pub struct InstrumentReportApp {
    /// Status stream to read [default: standard input]
    #[arg(value_name = "INPUT")]
    input: Option<Utf8PathBuf>,

    /// Run argument, as KEY=VALUE (for example `outfile=report.xml`)
    #[arg(
        short = 'e',
        long = "arg",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    args: Vec<(String, String)>,

    /// Directory to write the report to, if no external files directory is set
    #[arg(long, value_name = "DIR", default_value = ".")]
    files_dir: Utf8PathBuf,

    /// External files directory; takes precedence over --files-dir
    #[arg(long, value_name = "DIR")]
    external_files_dir: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,
}

impl InstrumentReportApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(self) -> Result<i32> {
        let input: Box<dyn BufRead> = match &self.input {
            Some(path) => {
                let file = File::open(path).map_err(|err| ExpectedError::InputOpen {
                    path: path.clone(),
                    err,
                })?;
                Box::new(BufReader::new(file))
            }
            None => Box::new(io::stdin().lock()),
        };

        let arguments: StatusBundle = self.args.into_iter().collect();
        let host = StreamHost::new(self.files_dir, self.external_files_dir);

        let executor =
            WorkerThreadExecutor::new().map_err(|err| ExpectedError::ExecutorSpawn { err })?;
        let mut builder = RunControllerBuilder::new();
        builder.set_executor(executor);
        let mut controller = builder.build(host);

        controller
            .on_run_start(&arguments)
            .map_err(|err| ExpectedError::ReportSetup { err })?;
        let mut session = ReplaySession {
            report_path: controller
                .report_path()
                .map(ToOwned::to_owned)
                .unwrap_or_default(),
            write_error: None,
        };

        let replayed = session.replay(&mut controller, input);

        // Always finish the run, so that whatever was reported so far is completed.
        let (code, fields) = match &replayed {
            Ok(Some(finish)) => (finish.0, finish.1.clone()),
            Ok(None) | Err(_) => (0, StatusBundle::new()),
        };
        if let Err(err) = controller.on_run_finish(code, &fields) {
            session.record(err);
        }
        replayed?;

        if let Some(err) = session.write_error {
            return Err(ExpectedError::ReportWrite {
                path: session.report_path,
                err,
            });
        }

        info!(
            result_code = controller.host().result_code(),
            "replay complete"
        );
        Ok(InstrumentReportExitCode::OK)
    }
}

struct ReplaySession {
    report_path: Utf8PathBuf,
    // The first error that stopped reporting, if any.
    write_error: Option<ReportError>,
}

impl ReplaySession {
    /// Feeds status records to the controller until a finish record or the end of input.
    ///
    /// Returns the finish record, if there was one.
    fn replay(
        &mut self,
        controller: &mut RunController<StreamHost>,
        input: Box<dyn BufRead>,
    ) -> Result<Option<(i32, StatusBundle)>> {
        for (index, line) in input.lines().enumerate() {
            let line = line.map_err(|err| ExpectedError::InputRead { err })?;
            if line.trim().is_empty() {
                continue;
            }

            let record: StatusRecord =
                serde_json::from_str(&line).map_err(|err| ExpectedError::InputParse {
                    line: index + 1,
                    err,
                })?;
            match record {
                StatusRecord::Status { code, fields } => {
                    if let Err(err) = controller.on_status(code, &fields) {
                        self.record(err);
                    }
                }
                StatusRecord::Finish { code, fields } => {
                    return Ok(Some((code, fields)));
                }
            }
        }

        warn!("status stream ended without a finish event, finishing run");
        Ok(None)
    }

    fn record(&mut self, err: ReportError) {
        // Protocol errors have already been logged and skipped.
        if !err.is_recoverable() && self.write_error.is_none() {
            self.write_error = Some(err);
        }
    }
}

fn parse_key_value(input: &str) -> std::result::Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, found `{input}`")),
    }
}
