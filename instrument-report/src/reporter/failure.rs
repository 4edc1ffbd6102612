// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::borrow::Cow;

/// The type and message of a failure, extracted from its stack trace.
///
/// Stack traces are free-form text, so this is a heuristic over the first line: whatever comes
/// before the first colon is the type, and whatever comes after it is the message. The leading
/// space of the message is kept as-is to stay compatible with existing reports.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FailureDetail<'a> {
    /// The failure type, e.g. `java.lang.NullPointerException`.
    pub ty: &'a str,

    /// The failure message. Empty if the first line has no colon.
    pub message: &'a str,

    /// The full stack trace.
    pub raw_stack: &'a str,
}

impl<'a> FailureDetail<'a> {
    /// Parses a stack trace. This never fails.
    pub fn parse(stack: &'a str) -> Self {
        let reason = match stack.find('\n') {
            Some(index) => &stack[..index],
            None => stack,
        };

        let (ty, message) = match reason.split_once(':') {
            Some((ty, message)) => (ty, message),
            None => (reason, ""),
        };

        Self {
            ty,
            message,
            raw_stack: stack,
        }
    }
}

/// Makes host-supplied text safe to embed in the report.
///
/// ANSI escape sequences are stripped, and any remaining characters that XML 1.0 cannot
/// represent are dropped.
pub(crate) fn xml_safe_text(text: &str) -> Cow<'_, str> {
    let text = if text.contains('\u{1b}') {
        Cow::Owned(strip_ansi_escapes::strip_str(text))
    } else {
        Cow::Borrowed(text)
    };

    if text.chars().all(is_xml_char) {
        text
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{d7ff}')
        || matches!(c, '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}
