// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while writing to a [`ReportWriter`](crate::ReportWriter).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteError {
    /// The XML writer failed to emit an event.
    #[error("error writing XML event")]
    Xml(#[from] quick_xml::Error),

    /// Flushing the underlying sink failed.
    #[error("error flushing report output")]
    Io(#[from] std::io::Error),

    /// An attribute was set when there was no start tag to attach it to.
    ///
    /// Attributes can only be added to the most recently opened element, and only before any
    /// content has been written into it.
    #[error("cannot set attribute `{name}`: no start tag is open")]
    NoOpenStartTag {
        /// The name of the attribute.
        name: String,
    },
}
