// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data model for the uxprobe regression check harness.
//!
//! This crate defines the types shared by every other uxprobe crate:
//!
//! - [`types`] - metric units, directionality, tolerance and measurements
//! - [`suite`] - the declarative check suite loaded from a TOML file
//! - [`compare`] - the baseline comparator producing a per-check [`compare::Outcome`]
//! - [`summary`] - per-check reports and the aggregate [`summary::RunSummary`]
//!
//! # Quick Start
//!
//! ```
//! use uxprobe_core::compare::{compare, Outcome};
//! use uxprobe_core::types::{Direction, Tolerance};
//!
//! let tolerance = Tolerance::new(1.1).unwrap();
//! let outcome = compare(900.0, Some(850.0), tolerance, Direction::LowerIsBetter);
//! assert!(matches!(outcome, Outcome::Passed { .. }));
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod compare;
pub mod suite;
pub mod summary;
pub mod types;

pub use compare::{compare, Outcome};
pub use suite::{CheckSpec, ProbeSpec, Suite};
pub use summary::{CheckReport, RunSummary};
pub use types::{BaselineRecord, Direction, Measurement, MetricUnit, Tolerance};
