// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The boundary between an instrumentation host and the report.
//!
//! [`RunController`] receives the host's lifecycle and status callbacks, decodes them into
//! [`RunEvent`](crate::events::RunEvent)s for the [`JunitReporter`](crate::reporter::JunitReporter),
//! and passes every callback on to the host.

mod executor;
mod host;
mod imp;

pub use executor::*;
pub use host::*;
pub use imp::*;
