// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! The baseline comparator: decides pass/fail for one measurement.
//!
//! For lower-is-better metrics the allowed ceiling is
//! `baseline * tolerance`; for higher-is-better metrics the allowed floor is
//! `baseline / tolerance`. Exact equality with the threshold counts as a
//! pass in both directions.

use crate::types::{Direction, Tolerance};
use serde::{Deserialize, Serialize};

/// Decision for one executed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Observed value is within tolerance of the baseline.
    Passed {
        /// The computed threshold the value was compared against.
        allowed: f64,
        /// Signed distance from the threshold; negative means headroom.
        margin: f64,
    },
    /// Observed value regressed past the tolerance-adjusted baseline.
    Failed {
        /// The computed threshold the value was compared against.
        allowed: f64,
        /// Signed distance from the threshold; positive means over.
        margin: f64,
    },
    /// No baseline existed; the observed value becomes the new baseline.
    ///
    /// Counts as a success for exit-code purposes, but is reported under its
    /// own marker so CI logs can distinguish it from a true pass.
    BaselineEstablished,
    /// The probe itself failed (element never appeared, navigation error).
    ///
    /// A correctness failure of the application under test, reported
    /// separately from tolerance failures and never conflated with "slow".
    Error {
        /// Human-readable description of the probe failure.
        message: String,
    },
}

impl Outcome {
    /// True for outcomes that do not fail the run (`Passed` and
    /// `BaselineEstablished`).
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Passed { .. } | Outcome::BaselineEstablished)
    }
}

/// Compare one observed value against its baseline, if any.
///
/// An absent baseline yields [`Outcome::BaselineEstablished`]; the caller is
/// responsible for persisting the observed value as the new record.
///
/// The margin is oriented so that a positive value always means "worse than
/// allowed": `observed - allowed` for lower-is-better, `allowed - observed`
/// for higher-is-better.
pub fn compare(
    observed: f64,
    baseline: Option<f64>,
    tolerance: Tolerance,
    direction: Direction,
) -> Outcome {
    let Some(baseline) = baseline else {
        return Outcome::BaselineEstablished;
    };

    let (allowed, margin) = match direction {
        Direction::LowerIsBetter => {
            let allowed = baseline * tolerance.multiplier();
            (allowed, observed - allowed)
        }
        Direction::HigherIsBetter => {
            let allowed = baseline / tolerance.multiplier();
            (allowed, allowed - observed)
        }
    };

    // Non-strict: landing exactly on the threshold passes.
    if margin <= 0.0 {
        Outcome::Passed { allowed, margin }
    } else {
        Outcome::Failed { allowed, margin }
    }
}
