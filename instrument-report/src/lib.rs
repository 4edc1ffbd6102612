// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Streaming JUnit XML reports for instrumentation test runs.
//!
//! An instrumentation host runs tests and reports on them through status callbacks: a numeric
//! status code, and an untyped [`StatusBundle`](bundle::StatusBundle) of fields. This crate turns
//! those callbacks into a JUnit report that is written and flushed one test case at a time.
//!
//! The entry point for hosts is [`RunController`](controller::RunController). Lower-level users
//! can decode [`RunEvent`](events::RunEvent)s themselves and drive a
//! [`JunitReporter`](reporter::JunitReporter) directly.

pub mod bundle;
pub mod config;
pub mod controller;
pub mod errors;
pub mod events;
pub mod reporter;
mod stopwatch;
#[cfg(test)]
mod test_helpers;
pub mod usage;
