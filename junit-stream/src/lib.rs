// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write JUnit reports incrementally, one element at a time.
//!
//! Unlike a report data model that is serialized in one go at the end of a run, a
//! [`ReportWriter`] emits XML as soon as it is available, so that a partially written report can
//! be recovered if the process goes away mid-run.

mod errors;
mod writer;

pub use errors::*;
pub use writer::*;
