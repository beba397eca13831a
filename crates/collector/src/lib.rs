// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metric collection against a live browser.
//!
//! This crate drives one user-facing action per check inside a real
//! Chromium session and produces the observed value the comparator judges.
//!
//! - [`driver`] - the [`driver::PageDriver`] seam and its CDP-backed
//!   implementation
//! - [`session`] - scoped browser session acquisition with guaranteed
//!   teardown
//! - [`probe`] - the [`probe::Collector`] that executes one check's probe
//! - [`error`] - the collection failure taxonomy
//!
//! Element-not-found is a correctness failure of the application under
//! test, kept strictly distinct from a slow-but-present measurement.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod driver;
pub mod error;
pub mod probe;
pub mod session;

pub use driver::{ChromeDriver, PageDriver};
pub use error::CollectError;
pub use probe::{Collector, CollectorConfig};
pub use session::BrowserSession;
