// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Declarative check suite definition.
//!
//! A suite is a TOML document naming the checks to run against the
//! application under test. Directionality is a required field of every
//! check; the harness never guesses which way "better" points.
//!
//! # Example
//!
//! ```toml
//! [suite]
//! name = "collection-dashboard"
//!
//! [[check]]
//! name = "page-load"
//! metric = "initial_load_time"
//! unit = "milliseconds"
//! direction = "lower_is_better"
//! probe = { kind = "navigation", path = "/", ready_selector = "main" }
//! ```

use crate::types::{Direction, MetricUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a suite file.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The suite file could not be read.
    #[error("failed to read suite file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The suite file is not valid TOML or is missing required fields.
    #[error("invalid suite file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A check definition violates a structural constraint.
    #[error("invalid check '{check}': {reason}")]
    InvalidCheck {
        /// Name of the offending check.
        check: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The suite contains no checks at all.
    #[error("suite '{0}' defines no checks")]
    Empty(String),
}

/// Result type for suite operations.
pub type Result<T> = std::result::Result<T, SuiteError>;

/// What a check measures and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Wall-clock duration from navigation start until `ready_selector`
    /// becomes visible.
    Navigation {
        /// Path under the base URL to navigate to.
        path: String,
        /// Selector whose visibility marks the page as ready.
        ready_selector: String,
    },
    /// Number of DOM nodes matching `selector` after the page settles.
    ElementCount {
        /// Path under the base URL to navigate to.
        path: String,
        /// Selector to count.
        selector: String,
    },
    /// Numeric pixel value of a computed CSS property on the first match.
    StyleValue {
        /// Path under the base URL to navigate to.
        path: String,
        /// Selector for the target element.
        selector: String,
        /// CSS property name, e.g. `height` or `padding-left`.
        property: String,
    },
    /// Arbitrary page-side expression returning a number, for metrics the
    /// browser already exposes (`performance.timing` deltas, resource
    /// counts, a computed score).
    ScriptValue {
        /// Path under the base URL to navigate to.
        path: String,
        /// JavaScript expression evaluated in the page.
        expression: String,
    },
}

impl ProbeSpec {
    /// The path component this probe navigates to.
    pub fn path(&self) -> &str {
        match self {
            ProbeSpec::Navigation { path, .. }
            | ProbeSpec::ElementCount { path, .. }
            | ProbeSpec::StyleValue { path, .. }
            | ProbeSpec::ScriptValue { path, .. } => path,
        }
    }
}

/// One named, repeatable measurement-and-comparison unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Check name, e.g. `page-load`. Combined with `metric` it keys the
    /// baseline store.
    pub name: String,
    /// Metric name, e.g. `initial_load_time`.
    pub metric: String,
    /// Unit of the measured value.
    pub unit: MetricUnit,
    /// Which way "better" points for this metric.
    pub direction: Direction,
    /// How the value is measured.
    pub probe: ProbeSpec,
    /// Per-check tolerance override; falls back to the run-wide multiplier.
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Per-check wait budget in milliseconds; falls back to the collector
    /// default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl CheckSpec {
    /// `check.metric`, the display and storage key for this check.
    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.metric)
    }
}

#[derive(Debug, Deserialize)]
struct SuiteMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SuiteFile {
    suite: SuiteMeta,
    #[serde(default, rename = "check")]
    checks: Vec<CheckSpec>,
}

/// A validated set of checks to run.
#[derive(Debug, Clone)]
pub struct Suite {
    /// Suite name, used in reports.
    pub name: String,
    /// The checks, in file order.
    pub checks: Vec<CheckSpec>,
}

impl Suite {
    /// Parse and validate a suite from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: SuiteFile = toml::from_str(text)?;
        let suite = Suite {
            name: file.suite.name,
            checks: file.checks,
        };
        suite.validate()?;
        Ok(suite)
    }

    /// Load and validate a suite file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SuiteError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.checks.is_empty() {
            return Err(SuiteError::Empty(self.name.clone()));
        }
        // The (name, metric) pair keys the baseline store; a duplicate would
        // make the second check silently compare against the first one's
        // freshly established record.
        let mut seen = HashSet::new();
        for check in &self.checks {
            if !seen.insert(check.key()) {
                return Err(SuiteError::InvalidCheck {
                    check: check.key(),
                    reason: "duplicate check/metric pair".into(),
                });
            }
        }
        for check in &self.checks {
            if check.name.trim().is_empty() || check.metric.trim().is_empty() {
                return Err(SuiteError::InvalidCheck {
                    check: check.key(),
                    reason: "check and metric names must be non-empty".into(),
                });
            }
            if let Some(t) = check.tolerance {
                if !t.is_finite() || t < 1.0 {
                    return Err(SuiteError::InvalidCheck {
                        check: check.key(),
                        reason: format!("tolerance override must be >= 1.0, got {t}"),
                    });
                }
            }
            if let Some(0) = check.timeout_ms {
                return Err(SuiteError::InvalidCheck {
                    check: check.key(),
                    reason: "timeout_ms must be non-zero".into(),
                });
            }
        }
        Ok(())
    }
}
