// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to stream JUnit XML reports from run events.

use super::failure::{FailureDetail, xml_safe_text};
use crate::{
    errors::{ProtocolError, ReportError, XmlStateError},
    events::{RunEvent, TestFinished, TestStarted},
    stopwatch::{StopwatchStart, stopwatch},
};
use junit_stream::{
    FAILURE_TAG, ReportWriter, TESTCASE_TAG, TESTSUITE_TAG, TESTSUITES_TAG, WriteError,
};
use std::{fmt, io};
use tracing::{debug, info, warn};

/// The phase a [`JunitReporter`] is in.
///
/// Phases only ever move forward: `Unopened`, then `SuiteOpen`, then `Closed`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportPhase {
    /// Nothing has been written yet.
    Unopened,

    /// The document and its single test suite are open, and test cases are being written.
    SuiteOpen,

    /// The document has been completed, or reporting was aborted. The sink has been released.
    Closed,
}

impl fmt::Display for ReportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPhase::Unopened => write!(f, "unopened"),
            ReportPhase::SuiteOpen => write!(f, "open"),
            ReportPhase::Closed => write!(f, "closed"),
        }
    }
}

/// The test that is currently running.
#[derive(Clone, Debug)]
struct TestRecord {
    class_name: Option<String>,
    test_method: Option<String>,
    started: StopwatchStart,
}

/// Builds a JUnit report from [`RunEvent`]s as they arrive.
///
/// The report has a fixed shape: one `testsuites` element holding one `testsuite`, named after
/// the class of the first test that starts, with one `testcase` per result. Test cases are
/// written, and the sink flushed, as soon as each result arrives, so the file on disk is usable
/// even if the run never completes.
///
/// Tests are assumed to run one at a time. The report completes by itself once a result with
/// `current == total` is seen; [`finalize`](Self::finalize) completes it early on teardown.
#[derive(Debug)]
pub struct JunitReporter<W: io::Write> {
    phase: ReportPhase,
    // Invariant: writer is Some unless phase is Closed.
    writer: Option<ReportWriter<W>>,
    last_test_start: Option<TestRecord>,
    seen_first_start: bool,
    testcases_written: usize,
}

impl<W: io::Write> JunitReporter<W> {
    /// Creates a new reporter over the given sink. Nothing is written until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(sink: W) -> Self {
        Self {
            phase: ReportPhase::Unopened,
            writer: Some(ReportWriter::new(sink)),
            last_test_start: None,
            seen_first_start: false,
            testcases_written: 0,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> ReportPhase {
        self.phase
    }

    /// Returns the number of test cases written so far.
    pub fn testcases_written(&self) -> usize {
        self.testcases_written
    }

    /// Opens the document and its test suite.
    pub fn initialize(&mut self) -> Result<(), ReportError> {
        if self.phase != ReportPhase::Unopened {
            return Err(XmlStateError::new("initialize the report", self.phase).into());
        }

        self.write_with("initialize the report", |writer| {
            writer.open_document()?;
            writer.open_element(TESTSUITES_TAG)?;
            // The suite is named lazily, by the first test that starts.
            writer.open_element(TESTSUITE_TAG)
        })?;
        self.phase = ReportPhase::SuiteOpen;
        Ok(())
    }

    /// Handles a single event.
    pub fn write_event(&mut self, event: &RunEvent) -> Result<(), ReportError> {
        match event {
            RunEvent::Start(started) => self.on_start(started),
            RunEvent::Result(finished) => self.on_result(finished),
        }
    }

    /// Records the start of a test.
    pub fn on_start(&mut self, event: &TestStarted) -> Result<(), ReportError> {
        self.check_open("record a test start", "start")?;

        if let Some(previous) = self.last_test_start.take() {
            warn!(
                class_name = previous.class_name.as_deref(),
                test_method = previous.test_method.as_deref(),
                "test started before the previous test reported a result, discarding previous start"
            );
        }

        if !self.seen_first_start {
            self.seen_first_start = true;
            if let Some(class_name) = &event.class_name {
                self.write_with("name the test suite", |writer| {
                    writer.set_attribute("name", &xml_safe_text(class_name))
                })?;
            }
        }

        let started = stopwatch();
        debug!(
            class_name = event.class_name.as_deref(),
            test_method = event.test_method.as_deref(),
            start_time = %started.start_time(),
            "test started"
        );
        self.last_test_start = Some(TestRecord {
            class_name: event.class_name.clone(),
            test_method: event.test_method.clone(),
            started,
        });
        Ok(())
    }

    /// Writes the test case for a finished test, and completes the report if this was the last
    /// test of the run.
    ///
    /// A result without a preceding start is rejected with a [`ProtocolError`] and nothing is
    /// written.
    pub fn on_result(&mut self, event: &TestFinished) -> Result<(), ReportError> {
        self.check_open("record a test result", "result")?;

        let Some(record) = self.last_test_start.take() else {
            return Err(ProtocolError::ResultWithoutStart {
                class_name: event.class_name.clone(),
                test_method: event.test_method.clone(),
            }
            .into());
        };
        let elapsed = record.started.snapshot();

        if record.class_name != event.class_name || record.test_method != event.test_method {
            debug!(
                started_class = record.class_name.as_deref(),
                started_method = record.test_method.as_deref(),
                "result names differ from the start they are matched with"
            );
        }

        self.write_with("write a test case", |writer| {
            writer.open_element(TESTCASE_TAG)?;
            if let Some(class_name) = &event.class_name {
                writer.set_attribute("classname", &xml_safe_text(class_name))?;
            }
            if let Some(test_method) = &event.test_method {
                writer.set_attribute("name", &xml_safe_text(test_method))?;
            }

            if event.outcome.is_success() {
                writer.set_attribute("time", &elapsed.junit_time())?;
            } else {
                writer.open_element(FAILURE_TAG)?;
                let stack = event.stack.as_deref().map(xml_safe_text);
                if let Some(stack) = stack.filter(|stack| !stack.is_empty()) {
                    let detail = FailureDetail::parse(&stack);
                    writer.set_attribute("message", detail.message)?;
                    writer.set_attribute("type", detail.ty)?;
                    writer.write_text(detail.raw_stack)?;
                }
                writer.close_element(FAILURE_TAG)?;
            }

            writer.close_element(TESTCASE_TAG)?;
            writer.flush()
        })?;
        self.testcases_written += 1;

        debug!(
            class_name = event.class_name.as_deref(),
            test_method = event.test_method.as_deref(),
            outcome = %event.outcome,
            start_time = %elapsed.start_time,
            time_taken = ?elapsed.duration,
            current = event.current,
            total = event.total,
            "test case written"
        );

        if event.is_last() {
            self.close_report()?;
        }
        Ok(())
    }

    /// Completes the report if it is still open.
    ///
    /// This is safe to call at any time and any number of times: it does nothing unless the
    /// suite is open.
    pub fn finalize(&mut self) -> Result<(), ReportError> {
        if self.phase != ReportPhase::SuiteOpen {
            return Ok(());
        }

        if let Some(record) = self.last_test_start.take() {
            warn!(
                class_name = record.class_name.as_deref(),
                test_method = record.test_method.as_deref(),
                "report finalized while a test was still running, its result is not recorded"
            );
        }
        self.close_report()
    }

    fn close_report(&mut self) -> Result<(), ReportError> {
        self.write_with("close the report", |writer| {
            writer.close_element(TESTSUITE_TAG)?;
            writer.close_element(TESTSUITES_TAG)
        })?;

        self.phase = ReportPhase::Closed;
        self.last_test_start = None;
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }

        info!(testcases = self.testcases_written, "JUnit report completed");
        Ok(())
    }

    fn check_open(
        &self,
        operation: &'static str,
        event_kind: &'static str,
    ) -> Result<(), ReportError> {
        match self.phase {
            ReportPhase::SuiteOpen => Ok(()),
            ReportPhase::Unopened => Err(XmlStateError::new(operation, self.phase).into()),
            ReportPhase::Closed => Err(ProtocolError::EventAfterClose { kind: event_kind }.into()),
        }
    }

    /// Runs a sequence of writes. If any of them fails, reporting is aborted: the sink is
    /// dropped and the reporter moves to the closed phase.
    fn write_with<F>(&mut self, operation: &'static str, f: F) -> Result<(), ReportError>
    where
        F: FnOnce(&mut ReportWriter<W>) -> Result<(), WriteError>,
    {
        let Some(writer) = self.writer.as_mut() else {
            return Err(XmlStateError::new(operation, self.phase).into());
        };

        if let Err(error) = f(writer) {
            self.writer = None;
            self.last_test_start = None;
            self.phase = ReportPhase::Closed;
            return Err(ReportError::Write(error));
        }
        Ok(())
    }
}
