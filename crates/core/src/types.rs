// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared value types for measurements and baselines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unit of a measured metric, used for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    /// Wall-clock duration in milliseconds.
    Milliseconds,
    /// Payload or asset size in bytes.
    Bytes,
    /// Dimensionless count (DOM nodes, requests, errors).
    Count,
    /// Computed CSS pixel value.
    Pixels,
    /// Dimensionless score (e.g. an accessibility score).
    Score,
}

impl MetricUnit {
    /// Display suffix appended after a value, empty for dimensionless units.
    pub fn suffix(&self) -> &'static str {
        match self {
            MetricUnit::Milliseconds => "ms",
            MetricUnit::Bytes => "B",
            MetricUnit::Count => "",
            MetricUnit::Pixels => "px",
            MetricUnit::Score => "",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Whether smaller or larger observed values are the healthy direction.
///
/// Directionality is a required, explicit field of every check; it is never
/// inferred from the metric name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Durations, byte counts, node counts: regressions grow the value.
    LowerIsBetter,
    /// Scores: regressions shrink the value.
    HigherIsBetter,
}

/// Error returned for an out-of-range tolerance multiplier.
#[derive(Debug, Error, PartialEq)]
#[error("tolerance multiplier must be finite and >= 1.0, got {0}")]
pub struct InvalidTolerance(pub f64);

/// Allowed proportional degradation before a metric is flagged as regressed.
///
/// A multiplier of `1.1` permits a 10% slowdown for lower-is-better metrics
/// and a 10% drop (divided, not subtracted) for higher-is-better metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Create a validated tolerance. Multipliers below 1.0 would flag runs
    /// that are strictly better than baseline, so they are rejected.
    pub fn new(multiplier: f64) -> Result<Self, InvalidTolerance> {
        if multiplier.is_finite() && multiplier >= 1.0 {
            Ok(Tolerance(multiplier))
        } else {
            Err(InvalidTolerance(multiplier))
        }
    }

    /// The raw multiplier.
    pub fn multiplier(&self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    /// 10% slack, the conventional default of the harness.
    fn default() -> Self {
        Tolerance(1.1)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

/// One observed value, produced by a single probe execution.
///
/// Ephemeral: owned by the run that produced it and consumed by the
/// comparator and reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Check name, e.g. `page-load`.
    pub check: String,
    /// Metric name, e.g. `initial_load_time`.
    pub metric: String,
    /// Observed value in `unit`.
    pub observed: f64,
    /// Unit of `observed`.
    pub unit: MetricUnit,
}

/// Last-accepted value of a metric, the comparison point for regression
/// detection. At most one record exists per `(check, metric)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    /// The accepted value.
    pub value: f64,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl BaselineRecord {
    /// Create a record stamped with the current time.
    pub fn now(value: f64) -> Self {
        Self {
            value,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_rejects_below_one() {
        assert_eq!(Tolerance::new(0.9), Err(InvalidTolerance(0.9)));
        assert_eq!(Tolerance::new(f64::NAN).is_err(), true);
        assert!(Tolerance::new(1.0).is_ok());
        assert!(Tolerance::new(2.5).is_ok());
    }

    #[test]
    fn test_default_tolerance_is_ten_percent() {
        assert_eq!(Tolerance::default().multiplier(), 1.1);
    }

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(MetricUnit::Milliseconds.suffix(), "ms");
        assert_eq!(MetricUnit::Count.suffix(), "");
        assert_eq!(format!("{}", MetricUnit::Pixels), "px");
    }

    #[test]
    fn test_direction_serde_round_trip() {
        let json = serde_json::to_string(&Direction::LowerIsBetter).unwrap();
        assert_eq!(json, "\"lower_is_better\"");
        let back: Direction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Direction::LowerIsBetter);
    }

    #[test]
    fn test_baseline_record_serializes_timestamp() {
        let record = BaselineRecord::now(850.0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"value\":850.0"));
        assert!(json.contains("updated_at"));
    }
}
