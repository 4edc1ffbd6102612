// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ActivityFinisher, InlineExecutor, InstrumentationHost, MainThreadExecutor};
use crate::{
    bundle::StatusBundle,
    config::RunArguments,
    errors::{DisplayErrorChain, ReportError, XmlStateError},
    events::RunEvent,
    reporter::{JunitReporter, ReportPhase},
    usage::{NoopUsageTracker, TEST_RUNNER_USAGE, UsageTracker},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fs::File,
    io::{self, BufWriter},
    sync::Arc,
};
use tracing::{debug, error, info, warn};

/// Opens the sink that a report is written to, given the report path.
pub type ReportSinkFactory = Box<dyn FnMut(&Utf8Path) -> io::Result<Box<dyn io::Write>>>;

/// Run controller options.
#[derive(Default)]
pub struct RunControllerBuilder {
    usage_tracker: Option<Box<dyn UsageTracker>>,
    finisher: Option<Arc<dyn ActivityFinisher>>,
    executor: Option<Box<dyn MainThreadExecutor>>,
    open_sink: Option<ReportSinkFactory>,
}

impl RunControllerBuilder {
    /// Creates a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the usage tracker. Defaults to [`NoopUsageTracker`].
    ///
    /// The tracker is replaced with a [`NoopUsageTracker`] if the run is started with
    /// analytics disabled.
    pub fn set_usage_tracker(&mut self, tracker: impl UsageTracker + 'static) -> &mut Self {
        self.usage_tracker = Some(Box::new(tracker));
        self
    }

    /// Sets the hook that cleans up activities before each test.
    pub fn set_activity_finisher(&mut self, finisher: impl ActivityFinisher) -> &mut Self {
        self.finisher = Some(Arc::new(finisher));
        self
    }

    /// Sets the executor the activity finisher is dispatched to. Defaults to
    /// [`InlineExecutor`].
    pub fn set_executor(&mut self, executor: impl MainThreadExecutor + 'static) -> &mut Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Sets how the report sink is opened. Defaults to creating a buffered file at the report
    /// path.
    pub fn set_report_sink(
        &mut self,
        open_sink: impl FnMut(&Utf8Path) -> io::Result<Box<dyn io::Write>> + 'static,
    ) -> &mut Self {
        self.open_sink = Some(Box::new(open_sink));
        self
    }

    /// Creates a new run controller around the given host.
    pub fn build<H: InstrumentationHost>(self, host: H) -> RunController<H> {
        RunController {
            host,
            usage_tracker: self
                .usage_tracker
                .unwrap_or_else(|| Box::new(NoopUsageTracker)),
            finisher: self.finisher,
            executor: self.executor.unwrap_or_else(|| Box::new(InlineExecutor)),
            open_sink: self
                .open_sink
                .unwrap_or_else(|| Box::new(create_report_file)),
            state: RunState::NotStarted,
        }
    }
}

/// Sits between an [`InstrumentationHost`] and its callbacks, writing a JUnit report as
/// status events go by.
///
/// Every callback is passed on to the host whether or not reporting succeeds: the `Result`s
/// returned by the `on_` methods describe the report only, and never change what the host sees.
pub struct RunController<H> {
    host: H,
    usage_tracker: Box<dyn UsageTracker>,
    finisher: Option<Arc<dyn ActivityFinisher>>,
    executor: Box<dyn MainThreadExecutor>,
    open_sink: ReportSinkFactory,
    state: RunState,
}

enum RunState {
    NotStarted,
    Reporting {
        path: Utf8PathBuf,
        reporter: JunitReporter<Box<dyn io::Write>>,
    },
    // Reporting was aborted after an IO failure, or the run is over.
    Stopped,
}

impl<H: InstrumentationHost> RunController<H> {
    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host, consuming the controller.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Returns the path of the report being written, if reporting is active.
    pub fn report_path(&self) -> Option<&Utf8Path> {
        match &self.state {
            RunState::Reporting { path, .. } => Some(path),
            RunState::NotStarted | RunState::Stopped => None,
        }
    }

    /// Starts a run: opens the report sink and the report.
    ///
    /// `arguments` is the bundle the host was started with.
    pub fn on_run_start(&mut self, arguments: &StatusBundle) -> Result<(), ReportError> {
        match &self.state {
            RunState::NotStarted => {}
            RunState::Reporting { reporter, .. } => {
                return Err(XmlStateError::new("start the run", reporter.phase()).into());
            }
            RunState::Stopped => {
                return Err(XmlStateError::new("start the run", ReportPhase::Closed).into());
            }
        }
        // Whatever happens below, the run has started.
        self.state = RunState::Stopped;

        let arguments = RunArguments::from_bundle(arguments);
        if arguments.disable_analytics {
            debug!("analytics disabled, usage will not be tracked");
            self.usage_tracker = Box::new(NoopUsageTracker);
        }
        self.usage_tracker.track_usage(TEST_RUNNER_USAGE);

        let output_dir = self
            .host
            .external_files_dir()
            .unwrap_or_else(|| self.host.files_dir());
        let path = arguments.report_path(&output_dir);

        let sink = (self.open_sink)(path.as_path()).map_err(|error| ReportError::Create {
            path: path.clone(),
            error,
        });
        let sink = match sink {
            Ok(sink) => sink,
            Err(error) => {
                error!(
                    error = %DisplayErrorChain::new(&error),
                    "JUnit reporting disabled for this run"
                );
                return Err(error);
            }
        };

        let mut reporter = JunitReporter::new(sink);
        if let Err(error) = reporter.initialize() {
            error!(
                error = %DisplayErrorChain::new(&error),
                "JUnit reporting disabled for this run"
            );
            return Err(error);
        }

        info!(%path, "writing JUnit report");
        self.state = RunState::Reporting { path, reporter };
        Ok(())
    }

    /// Handles a status callback, then passes it on to the host.
    pub fn on_status(&mut self, code: i32, fields: &StatusBundle) -> Result<(), ReportError> {
        debug!(code, fields = fields.len(), "status received");
        let res = self.report_status(code, fields);
        self.host.send_status(code, fields);
        res
    }

    /// Completes the report, sends usage data, then passes the finish call on to the host.
    pub fn on_run_finish(
        &mut self,
        result_code: i32,
        fields: &StatusBundle,
    ) -> Result<(), ReportError> {
        let res = match std::mem::replace(&mut self.state, RunState::Stopped) {
            RunState::Reporting { path, mut reporter } => {
                let res = reporter.finalize();
                match &res {
                    Ok(()) => info!(
                        %path,
                        testcases = reporter.testcases_written(),
                        "JUnit report written"
                    ),
                    Err(error) => error!(
                        %path,
                        error = %DisplayErrorChain::new(error),
                        "failed to complete JUnit report"
                    ),
                }
                res
            }
            RunState::NotStarted | RunState::Stopped => Ok(()),
        };

        if let Err(error) = self.usage_tracker.send_usages() {
            warn!(error = %DisplayErrorChain::new(error), "failed to send usage data");
        }

        self.host.finish(result_code, fields);
        res
    }

    fn report_status(&mut self, code: i32, fields: &StatusBundle) -> Result<(), ReportError> {
        let event = match RunEvent::decode(code, fields) {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(()),
            Err(error) => {
                warn!(code, %error, "skipping malformed status");
                return Err(error.into());
            }
        };

        if matches!(event, RunEvent::Start(_)) {
            self.dispatch_finisher();
        }

        let reporter = match &mut self.state {
            RunState::Reporting { reporter, .. } => reporter,
            RunState::NotStarted => {
                return Err(XmlStateError::new("report a status", ReportPhase::Unopened).into());
            }
            // Already logged when reporting stopped.
            RunState::Stopped => return Ok(()),
        };

        match reporter.write_event(&event) {
            Ok(()) => {
                if reporter.phase() == ReportPhase::Closed {
                    self.report_completed();
                }
                Ok(())
            }
            Err(error) if error.is_recoverable() => {
                warn!(kind = event.kind(), %error, "skipping status event");
                Err(error)
            }
            Err(error) => {
                error!(
                    error = %DisplayErrorChain::new(&error),
                    "JUnit reporting aborted for the rest of the run"
                );
                self.state = RunState::Stopped;
                Err(error)
            }
        }
    }

    fn report_completed(&mut self) {
        if let RunState::Reporting { path, reporter } =
            std::mem::replace(&mut self.state, RunState::Stopped)
        {
            info!(
                %path,
                testcases = reporter.testcases_written(),
                "JUnit report written"
            );
        }
    }

    fn dispatch_finisher(&self) {
        if let Some(finisher) = &self.finisher {
            let finisher = finisher.clone();
            self.executor
                .execute(Box::new(move || finisher.finish_activities()));
        }
    }
}

fn create_report_file(path: &Utf8Path) -> io::Result<Box<dyn io::Write>> {
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}
