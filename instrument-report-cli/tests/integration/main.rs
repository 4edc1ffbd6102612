// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests that run the `instrument-report` binary against recorded status streams.

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use indoc::indoc;
use instrument_report_cli::InstrumentReportExitCode;
use pretty_assertions::assert_eq;
use std::{fmt, process::Output};

static TWO_TESTS: &str = indoc! {r#"
    {"event":"status","code":1,"fields":{"class":"com.example.LoginTest","test":"testValidLogin","current":1,"numtests":2}}
    {"event":"status","code":0,"fields":{"class":"com.example.LoginTest","test":"testValidLogin","current":1,"numtests":2}}
    {"event":"status","code":1,"fields":{"class":"com.example.LoginTest","test":"testBadPassword","current":2,"numtests":2}}
    {"event":"status","code":-2,"fields":{"class":"com.example.LoginTest","test":"testBadPassword","stack":"junit.framework.AssertionFailedError: expected:<1> but was:<2>\n\tat com.example.LoginTest.testBadPassword(LoginTest.java:42)","current":2,"numtests":2}}
    {"event":"finish","code":-1,"fields":{"stream":"OK (2 tests)"}}
"#};

struct InstrumentReportCli {
    args: Vec<String>,
    stdin: Vec<u8>,
}

impl InstrumentReportCli {
    fn new() -> Self {
        Self {
            args: vec!["--color=never".to_owned()],
            stdin: Vec::new(),
        }
    }

    fn args(&mut self, args: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn stdin(&mut self, stdin: &str) -> &mut Self {
        self.stdin = stdin.as_bytes().to_vec();
        self
    }

    fn output(&self) -> CliOutput {
        let output = duct::cmd(env!("CARGO_BIN_EXE_instrument-report"), &self.args)
            .stdin_bytes(self.stdin.clone())
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("failed to execute");
        CliOutput(output)
    }
}

struct CliOutput(Output);

impl CliOutput {
    fn exit_code(&self) -> Option<i32> {
        self.0.status.code()
    }

    fn stderr_as_str(&self) -> String {
        String::from_utf8_lossy(&self.0.stderr).into_owned()
    }
}

impl fmt::Debug for CliOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exit code: {:?}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            self.exit_code(),
            String::from_utf8_lossy(&self.0.stdout),
            self.stderr_as_str(),
        )
    }
}

fn read_report(path: &Utf8Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|err| panic!("failed to read {path}: {err}"))
}

#[test]
fn replay_from_stdin() {
    let dir = Utf8TempDir::new().unwrap();

    let output = InstrumentReportCli::new()
        .args(["--files-dir", dir.path().as_str()])
        .stdin(TWO_TESTS)
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::OK),
        "{output:?}"
    );

    let report = read_report(&dir.path().join("junit-report.xml"));
    assert!(
        report.starts_with(
            r#"<?xml version="1.0"?><testsuites><testsuite name="com.example.LoginTest"><testcase classname="com.example.LoginTest" name="testValidLogin" time=""#
        ),
        "report: {report}"
    );
    assert!(
        report.ends_with(concat!(
            r#"<testcase classname="com.example.LoginTest" name="testBadPassword">"#,
            r#"<failure message=" expected:&lt;1&gt; but was:&lt;2&gt;" type="junit.framework.AssertionFailedError">"#,
            "junit.framework.AssertionFailedError: expected:&lt;1&gt; but was:&lt;2&gt;\n",
            "\tat com.example.LoginTest.testBadPassword(LoginTest.java:42)",
            "</failure></testcase></testsuite></testsuites>",
        )),
        "report: {report}"
    );
}

#[test]
fn replay_from_file_with_outfile() {
    let dir = Utf8TempDir::new().unwrap();
    let external = dir.path().join("external");
    std::fs::create_dir(&external).unwrap();
    let input = dir.path().join("stream.jsonl");
    std::fs::write(&input, TWO_TESTS).unwrap();

    let output = InstrumentReportCli::new()
        .args([
            "-e",
            "outfile=login.xml",
            "--files-dir",
            dir.path().as_str(),
            "--external-files-dir",
            external.as_str(),
            input.as_str(),
        ])
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::OK),
        "{output:?}"
    );

    let report = read_report(&external.join("login.xml"));
    assert_eq!(report.matches("<testcase ").count(), 2, "report: {report}");
    assert!(!dir.path().join("login.xml").exists());
}

#[test]
fn missing_finish_completes_report() {
    let dir = Utf8TempDir::new().unwrap();
    let truncated: String = TWO_TESTS.lines().take(3).map(|line| format!("{line}\n")).collect();

    let output = InstrumentReportCli::new()
        .args(["--files-dir", dir.path().as_str()])
        .stdin(&truncated)
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::OK),
        "{output:?}"
    );
    assert!(
        output.stderr_as_str().contains("without a finish event"),
        "{output:?}"
    );

    let report = read_report(&dir.path().join("junit-report.xml"));
    assert_eq!(report.matches("<testcase ").count(), 1, "report: {report}");
    assert!(report.ends_with("</testsuite></testsuites>"), "report: {report}");
}

#[test]
fn malformed_input() {
    let dir = Utf8TempDir::new().unwrap();
    let input = format!(
        "{}not json\n",
        TWO_TESTS.lines().next().map(|line| format!("{line}\n")).unwrap()
    );

    let output = InstrumentReportCli::new()
        .args(["--files-dir", dir.path().as_str()])
        .stdin(&input)
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::INPUT_PARSE_ERROR),
        "{output:?}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("failed to parse status stream at line 2"),
        "{output:?}"
    );

    // The report is still completed.
    let report = read_report(&dir.path().join("junit-report.xml"));
    assert!(report.ends_with("</testsuite></testsuites>"), "report: {report}");
}

#[test]
fn unwritable_output() {
    let dir = Utf8TempDir::new().unwrap();
    let missing: Utf8PathBuf = dir.path().join("does-not-exist");

    let output = InstrumentReportCli::new()
        .args(["--files-dir", missing.as_str()])
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::SETUP_ERROR),
        "{output:?}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("failed to set up JUnit report"),
        "{output:?}"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn report_write_failure() {
    // Every write to /dev/full fails with ENOSPC.
    let dev_full = Utf8Path::new("/dev/full");
    if !dev_full.exists() {
        return;
    }

    let output = InstrumentReportCli::new()
        .args(["-e", "outfile=full", "--files-dir", "/dev"])
        .stdin(TWO_TESTS)
        .output();
    assert_eq!(
        output.exit_code(),
        Some(InstrumentReportExitCode::WRITE_OUTPUT_ERROR),
        "{output:?}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("failed to write JUnit report to `/dev/full`"),
        "{output:?}"
    );
}
