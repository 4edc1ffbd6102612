// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The streaming writer.

use crate::WriteError;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{fmt, io};

/// The name of the root element of a JUnit report.
pub static TESTSUITES_TAG: &str = "testsuites";
/// The name of a test suite element.
pub static TESTSUITE_TAG: &str = "testsuite";
/// The name of a test case element.
pub static TESTCASE_TAG: &str = "testcase";
/// The name of the element nested in a test case that did not succeed.
pub static FAILURE_TAG: &str = "failure";

/// Writes a JUnit XML document to a sink as it is being built.
///
/// The writer is a cursor over the document: elements are opened, decorated with attributes,
/// filled with text and closed in order. Tag balance is the caller's responsibility.
///
/// The most recently opened start tag is held back until something is written inside it (or
/// it is closed), which is what allows attributes to be added after
/// [`open_element`](Self::open_element) returns. An element that is closed without any content
/// is written out as an empty tag.
pub struct ReportWriter<W> {
    writer: Writer<W>,
    pending: Option<BytesStart<'static>>,
}

impl<W> fmt::Debug for ReportWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportWriter")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<W: io::Write> ReportWriter<W> {
    /// Creates a new `ReportWriter` over the given sink.
    pub fn new(sink: W) -> Self {
        Self {
            writer: Writer::new(sink),
            pending: None,
        }
    }

    /// Writes the XML declaration.
    ///
    /// No encoding is declared.
    pub fn open_document(&mut self) -> Result<(), WriteError> {
        let decl = BytesDecl::new("1.0", None, None);
        self.writer.write_event(Event::Decl(decl))?;
        Ok(())
    }

    /// Opens a new element, nested inside the currently open one.
    pub fn open_element(&mut self, name: &str) -> Result<(), WriteError> {
        self.write_pending()?;
        self.pending = Some(BytesStart::new(name.to_owned()));
        Ok(())
    }

    /// Sets an attribute on the element that was most recently opened.
    ///
    /// Returns [`WriteError::NoOpenStartTag`] if content has already been written into that
    /// element, or if no element has been opened.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), WriteError> {
        match &mut self.pending {
            Some(tag) => {
                tag.push_attribute((name, value));
                Ok(())
            }
            None => Err(WriteError::NoOpenStartTag {
                name: name.to_owned(),
            }),
        }
    }

    /// Writes escaped text into the currently open element.
    pub fn write_text(&mut self, text: &str) -> Result<(), WriteError> {
        self.write_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Closes the element with the given name.
    pub fn close_element(&mut self, name: &str) -> Result<(), WriteError> {
        match self.pending.take() {
            Some(tag) if tag.name().as_ref() == name.as_bytes() => {
                self.writer.write_event(Event::Empty(tag))?;
            }
            Some(tag) => {
                self.writer.write_event(Event::Start(tag))?;
                self.writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            None => {
                self.writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
        }
        Ok(())
    }

    /// Flushes everything written so far to the sink.
    ///
    /// A start tag that can still accept attributes is not flushed.
    pub fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.get_mut().flush()?;
        Ok(())
    }

    /// Flushes the sink and returns it.
    ///
    /// A start tag that is still held back is written out first.
    pub fn close(mut self) -> Result<W, WriteError> {
        self.write_pending()?;
        self.flush()?;
        Ok(self.writer.into_inner())
    }

    fn write_pending(&mut self) -> Result<(), WriteError> {
        if let Some(tag) = self.pending.take() {
            self.writer.write_event(Event::Start(tag))?;
        }
        Ok(())
    }
}
