// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use regex::Regex;
use std::{io, sync::LazyLock};

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"time="[0-9]+\.[0-9]{3}""#).unwrap());

/// Replaces every `time` attribute with `[TIME]`.
pub(crate) fn redact_times(xml: &str) -> String {
    TIME_REGEX.replace_all(xml, r#"time="[TIME]""#).into_owned()
}

#[derive(Debug, Default)]
pub(crate) struct ParsedReport {
    pub(crate) testsuites_count: usize,
    pub(crate) suite_names: Vec<Option<String>>,
    pub(crate) testcases: Vec<ParsedTestcase>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedTestcase {
    pub(crate) classname: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) time: Option<String>,
    pub(crate) failure: Option<ParsedFailure>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedFailure {
    pub(crate) ty: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) text: String,
}

/// Parses a report, panicking if it is not well-formed.
///
/// Every character must be allowed by XML 1.0, which `quick-xml` does not check by itself.
pub(crate) fn parse_report(xml: &str) -> ParsedReport {
    if let Some((offset, c)) = xml.char_indices().find(|&(_, c)| !is_legal_xml_char(c)) {
        panic!("character {c:?} at byte {offset} is not allowed in XML 1.0: {xml:?}");
    }

    let mut reader = Reader::from_str(xml);
    let mut report = ParsedReport::default();
    let mut depth = 0usize;
    let mut in_failure = false;

    loop {
        let event = reader.read_event().expect("report is well-formed");
        match &event {
            Event::Start(tag) | Event::Empty(tag) => {
                let is_empty = matches!(event, Event::Empty(_));
                match tag.name().as_ref() {
                    b"testsuites" => report.testsuites_count += 1,
                    b"testsuite" => report.suite_names.push(attribute(tag, "name")),
                    b"testcase" => report.testcases.push(ParsedTestcase {
                        classname: attribute(tag, "classname"),
                        name: attribute(tag, "name"),
                        time: attribute(tag, "time"),
                        failure: None,
                    }),
                    b"failure" => {
                        let testcase = report
                            .testcases
                            .last_mut()
                            .expect("failure is nested in a testcase");
                        testcase.failure = Some(ParsedFailure {
                            ty: attribute(tag, "type"),
                            message: attribute(tag, "message"),
                            text: String::new(),
                        });
                        in_failure = !is_empty;
                    }
                    other => panic!("unexpected element {}", String::from_utf8_lossy(other)),
                }
                if !is_empty {
                    depth += 1;
                }
            }
            Event::Text(text) => {
                if in_failure {
                    let text = text.unescape().expect("text is valid");
                    let failure = report
                        .testcases
                        .last_mut()
                        .and_then(|testcase| testcase.failure.as_mut())
                        .expect("in a failure");
                    failure.text.push_str(&text);
                }
            }
            Event::End(_) => {
                in_failure = false;
                depth = depth.checked_sub(1).expect("end tags are balanced");
            }
            Event::Eof => break,
            _ => {}
        }
    }

    assert_eq!(depth, 0, "all elements are closed");
    report
}

fn is_legal_xml_char(c: char) -> bool {
    let c = u32::from(c);
    c == 0x9
        || c == 0xA
        || c == 0xD
        || (0x20..=0xD7FF).contains(&c)
        || (0xE000..=0xFFFD).contains(&c)
        || (0x10000..=0x10FFFF).contains(&c)
}

fn attribute(tag: &BytesStart<'_>, name: &str) -> Option<String> {
    tag.try_get_attribute(name)
        .expect("attributes are well-formed")
        .map(|attr| {
            attr.unescape_value()
                .expect("attribute value is valid")
                .into_owned()
        })
}

/// A sink that accepts a fixed number of bytes, then fails every write.
#[derive(Debug)]
pub(crate) struct FailingWriter {
    written: Vec<u8>,
    limit: usize,
}

impl FailingWriter {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            written: Vec::new(),
            limit,
        }
    }
}

impl io::Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.limit {
            return Err(io::Error::other("sink is full"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
