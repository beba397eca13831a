// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-check reports and the aggregate run summary.

use crate::compare::Outcome;
use crate::types::{Measurement, MetricUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished check: what was measured and how it was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Check name.
    pub check: String,
    /// Metric name.
    pub metric: String,
    /// Unit of the observed value.
    pub unit: MetricUnit,
    /// Observed value, absent when the probe itself failed.
    pub observed: Option<f64>,
    /// The comparator's decision.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl CheckReport {
    /// Build a report from a completed measurement and its outcome.
    pub fn measured(measurement: Measurement, outcome: Outcome) -> Self {
        Self {
            check: measurement.check,
            metric: measurement.metric,
            unit: measurement.unit,
            observed: Some(measurement.observed),
            outcome,
        }
    }

    /// Build a report for a check whose probe failed before producing a
    /// value.
    pub fn errored(check: &str, metric: &str, unit: MetricUnit, message: String) -> Self {
        Self {
            check: check.to_string(),
            metric: metric.to_string(),
            unit,
            observed: None,
            outcome: Outcome::Error { message },
        }
    }

    /// `check.metric` display key.
    pub fn key(&self) -> String {
        format!("{}.{}", self.check, self.metric)
    }
}

/// Aggregate of all check reports for one harness execution.
///
/// Created at run start, finalized at run end, and handed to the reporters
/// as the unit of external output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Name of the suite that was executed.
    pub suite: String,
    /// Base URL of the application under test.
    pub base_url: String,
    /// Run-wide tolerance multiplier.
    pub tolerance: f64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while still in progress.
    pub finished_at: Option<DateTime<Utc>>,
    /// One report per executed check, in execution order.
    pub reports: Vec<CheckReport>,
}

impl RunSummary {
    /// Start a new, empty summary stamped with the current time.
    pub fn begin(suite: &str, base_url: &str, tolerance: f64) -> Self {
        Self {
            suite: suite.to_string(),
            base_url: base_url.to_string(),
            tolerance,
            started_at: Utc::now(),
            finished_at: None,
            reports: Vec::new(),
        }
    }

    /// Append one finished check.
    pub fn push(&mut self, report: CheckReport) {
        self.reports.push(report);
    }

    /// Stamp the end of the run.
    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Total number of executed checks.
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Checks that passed against an existing baseline.
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed { .. }))
    }

    /// Checks that exceeded their tolerance threshold.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Checks that wrote a first-time baseline.
    pub fn established(&self) -> usize {
        self.count(|o| matches!(o, Outcome::BaselineEstablished))
    }

    /// Checks whose probe failed outright (correctness failures, distinct
    /// from tolerance failures).
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Error { .. }))
    }

    /// True when no check failed its comparison and no probe errored.
    /// Baseline establishment counts as success.
    pub fn is_success(&self) -> bool {
        self.reports.iter().all(|r| r.outcome.is_success())
    }

    /// Process exit code for CI gating: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// The failing reports, for the failure section of reporter output.
    pub fn failures(&self) -> impl Iterator<Item = &CheckReport> {
        self.reports.iter().filter(|r| !r.outcome.is_success())
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Measurement;

    fn measurement(check: &str, observed: f64) -> Measurement {
        Measurement {
            check: check.to_string(),
            metric: "initial_load_time".to_string(),
            observed,
            unit: MetricUnit::Milliseconds,
        }
    }

    #[test]
    fn test_counts_by_outcome() {
        let mut summary = RunSummary::begin("dash", "http://localhost:3000", 1.1);
        summary.push(CheckReport::measured(
            measurement("a", 900.0),
            Outcome::Passed {
                allowed: 935.0,
                margin: -35.0,
            },
        ));
        summary.push(CheckReport::measured(
            measurement("b", 1000.0),
            Outcome::Failed {
                allowed: 935.0,
                margin: 65.0,
            },
        ));
        summary.push(CheckReport::measured(
            measurement("c", 850.0),
            Outcome::BaselineEstablished,
        ));
        summary.push(CheckReport::errored(
            "d",
            "initial_load_time",
            MetricUnit::Milliseconds,
            "element not found: .bp5-table".into(),
        ));

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.established(), 1);
        assert_eq!(summary.errored(), 1);
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.failures().count(), 2);
    }

    #[test]
    fn test_established_only_run_is_success() {
        let mut summary = RunSummary::begin("dash", "http://localhost:3000", 1.1);
        summary.push(CheckReport::measured(
            measurement("a", 850.0),
            Outcome::BaselineEstablished,
        ));
        summary.finalize();

        assert!(summary.is_success());
        assert_eq!(summary.exit_code(), 0);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn test_summary_serializes_flat_outcome() {
        let mut summary = RunSummary::begin("dash", "http://localhost:3000", 1.1);
        summary.push(CheckReport::measured(
            measurement("a", 900.0),
            Outcome::Passed {
                allowed: 935.0,
                margin: -35.0,
            },
        ));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"outcome\":\"passed\""));
        assert!(json.contains("\"allowed\":935.0"));
    }
}
