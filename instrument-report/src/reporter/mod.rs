// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building JUnit reports from run events.
//!
//! The main structure in this module is [`JunitReporter`].

mod failure;
mod junit;

pub use failure::FailureDetail;
pub use junit::{JunitReporter, ReportPhase};
