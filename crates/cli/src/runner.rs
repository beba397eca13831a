//! Run orchestration: suite in, summary out.
//!
//! Checks execute sequentially, each inside its own browser session
//! (navigate, act, measure, compare, report). Probe failures are folded
//! into the summary and the run proceeds; a baseline store write failure
//! aborts the whole run, since later comparisons could not be trusted.

use anyhow::Context;
use std::path::PathBuf;
use tracing::{info, warn};
use uxprobe_collector::{BrowserSession, Collector};
use uxprobe_core::compare::{compare, Outcome};
use uxprobe_core::suite::{CheckSpec, Suite};
use uxprobe_core::summary::{CheckReport, RunSummary};
use uxprobe_core::types::{Measurement, Tolerance};
use uxprobe_report::console;
use uxprobe_store::BaselineStore;

/// Whether a run compares against baselines or rewrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compare observed values against stored baselines; only
    /// first-run keys are written.
    Check,
    /// Serialized update mode: every observed value overwrites its record.
    UpdateBaselines,
}

/// Everything a run needs, assembled from the CLI arguments.
#[derive(Debug)]
pub struct RunOptions {
    /// Path to the TOML check suite.
    pub suite: PathBuf,
    /// Base URL of the application under test.
    pub base_url: String,
    /// Path of the baseline store file.
    pub baselines: PathBuf,
    /// Run-wide tolerance multiplier.
    pub tolerance: Tolerance,
    /// Directory for report artifacts, if any.
    pub report_dir: Option<PathBuf>,
    /// Run the browser headless.
    pub headless: bool,
    /// Compare or update.
    pub mode: Mode,
}

/// Execute a full run and return the finalized summary.
///
/// # Errors
///
/// Fails fast on an unloadable suite or an unwritable baseline store;
/// everything else becomes a per-check report.
pub async fn execute(opts: RunOptions) -> anyhow::Result<RunSummary> {
    let suite = Suite::load(&opts.suite)
        .with_context(|| format!("cannot load suite {}", opts.suite.display()))?;
    // A corrupt store degrades to first-run behavior with a loud warning;
    // a missing one is simply the first run.
    let mut store = BaselineStore::load_lenient(&opts.baselines);

    info!(
        suite = %suite.name,
        base_url = %opts.base_url,
        checks = suite.checks.len(),
        mode = ?opts.mode,
        "starting run"
    );

    let mut summary = RunSummary::begin(&suite.name, &opts.base_url, opts.tolerance.multiplier());

    for check in &suite.checks {
        let measured = measure_in_session(&opts, check).await;
        let report = settle_check(opts.mode, opts.tolerance, check, &mut store, measured)?;
        console::print_check(&report);
        summary.push(report);
    }

    summary.finalize();
    console::print_summary(&summary);

    if let Some(dir) = &opts.report_dir {
        uxprobe_report::write_artifacts(&summary, dir);
    }

    Ok(summary)
}

/// Turn one measurement attempt into a report, persisting any newly
/// established baseline. Only a store write failure propagates; probe
/// failures fold into an errored report and the run proceeds.
fn settle_check(
    mode: Mode,
    run_tolerance: Tolerance,
    check: &CheckSpec,
    store: &mut BaselineStore,
    measured: uxprobe_collector::error::Result<Measurement>,
) -> anyhow::Result<CheckReport> {
    let measurement = match measured {
        Ok(measurement) => measurement,
        Err(e) => {
            warn!(check = %check.key(), error = %e, "probe failed");
            return Ok(CheckReport::errored(
                &check.name,
                &check.metric,
                check.unit,
                e.to_string(),
            ));
        }
    };

    let tolerance = check
        .tolerance
        .and_then(|t| Tolerance::new(t).ok())
        .unwrap_or(run_tolerance);

    let outcome = decide(mode, check, &measurement, store, tolerance);

    if matches!(outcome, Outcome::BaselineEstablished) {
        store.upsert(&check.name, &check.metric, measurement.observed);
        // Persist immediately: without durable baseline state the rest of
        // the run cannot make a trustworthy claim.
        store
            .save()
            .context("baseline store is unwritable, aborting run")?;
    }

    Ok(CheckReport::measured(measurement, outcome))
}

/// Launch a session, measure, and tear the session down on every path.
async fn measure_in_session(
    opts: &RunOptions,
    check: &CheckSpec,
) -> uxprobe_collector::error::Result<Measurement> {
    let session = BrowserSession::launch(opts.headless).await?;
    let collector = Collector::new(session.driver());
    let measured = collector.measure(&opts.base_url, check).await;
    session.close().await;
    measured
}

fn decide(
    mode: Mode,
    check: &CheckSpec,
    measurement: &Measurement,
    store: &BaselineStore,
    tolerance: Tolerance,
) -> Outcome {
    match mode {
        // Update mode rewrites every record, reported under the
        // baseline-established marker.
        Mode::UpdateBaselines => Outcome::BaselineEstablished,
        Mode::Check => {
            let baseline = store.get(&check.name, &check.metric).map(|r| r.value);
            compare(measurement.observed, baseline, tolerance, check.direction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uxprobe_core::suite::ProbeSpec;
    use uxprobe_core::types::{Direction, MetricUnit};

    fn spec() -> CheckSpec {
        CheckSpec {
            name: "page-load".into(),
            metric: "initial_load_time".into(),
            unit: MetricUnit::Milliseconds,
            direction: Direction::LowerIsBetter,
            probe: ProbeSpec::Navigation {
                path: "/".into(),
                ready_selector: "main".into(),
            },
            tolerance: None,
            timeout_ms: None,
        }
    }

    fn measurement(observed: f64) -> Measurement {
        Measurement {
            check: "page-load".into(),
            metric: "initial_load_time".into(),
            observed,
            unit: MetricUnit::Milliseconds,
        }
    }

    #[test]
    fn test_check_mode_compares_against_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BaselineStore::empty(dir.path().join("baselines.json"));
        store.upsert("page-load", "initial_load_time", 850.0);

        let outcome = decide(
            Mode::Check,
            &spec(),
            &measurement(1000.0),
            &store,
            Tolerance::new(1.1).unwrap(),
        );
        assert!(matches!(outcome, Outcome::Failed { .. }));

        let outcome = decide(
            Mode::Check,
            &spec(),
            &measurement(900.0),
            &store,
            Tolerance::new(1.1).unwrap(),
        );
        assert!(matches!(outcome, Outcome::Passed { .. }));
    }

    #[test]
    fn test_check_mode_establishes_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::empty(dir.path().join("baselines.json"));
        let outcome = decide(
            Mode::Check,
            &spec(),
            &measurement(850.0),
            &store,
            Tolerance::default(),
        );
        assert_eq!(outcome, Outcome::BaselineEstablished);
    }

    #[test]
    fn test_first_run_persists_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baselines.json");
        let mut store = BaselineStore::empty(&path);

        let report = settle_check(
            Mode::Check,
            Tolerance::default(),
            &spec(),
            &mut store,
            Ok(measurement(850.0)),
        )
        .unwrap();
        assert_eq!(report.outcome, Outcome::BaselineEstablished);

        // The record reached disk, and it is the only one.
        let on_disk = BaselineStore::load(&path).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(
            on_disk.get("page-load", "initial_load_time").unwrap().value,
            850.0
        );
    }

    #[test]
    fn test_passing_check_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baselines.json");
        let mut store = BaselineStore::empty(&path);
        store.upsert("page-load", "initial_load_time", 850.0);
        store.save().unwrap();

        let report = settle_check(
            Mode::Check,
            Tolerance::default(),
            &spec(),
            &mut store,
            Ok(measurement(900.0)),
        )
        .unwrap();
        assert!(matches!(report.outcome, Outcome::Passed { .. }));

        // A normal check run never overwrites an existing baseline.
        let on_disk = BaselineStore::load(&path).unwrap();
        assert_eq!(
            on_disk.get("page-load", "initial_load_time").unwrap().value,
            850.0
        );
    }

    #[test]
    fn test_unwritable_store_aborts_on_establish() {
        // A regular file in place of the parent directory makes save fail.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let mut store = BaselineStore::empty(blocker.join("baselines.json"));

        let result = settle_check(
            Mode::Check,
            Tolerance::default(),
            &spec(),
            &mut store,
            Ok(measurement(850.0)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_failure_folds_into_errored_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baselines.json");
        let mut store = BaselineStore::empty(&path);

        let report = settle_check(
            Mode::Check,
            Tolerance::default(),
            &spec(),
            &mut store,
            Err(uxprobe_collector::CollectError::ElementNotFound {
                selector: "main".into(),
                waited_ms: 10000,
            }),
        )
        .unwrap();

        assert!(matches!(report.outcome, Outcome::Error { .. }));
        assert!(report.observed.is_none());
        // Nothing was written for the failed probe.
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_update_mode_always_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BaselineStore::empty(dir.path().join("baselines.json"));
        store.upsert("page-load", "initial_load_time", 850.0);

        // Even a regressed value is accepted in update mode.
        let outcome = decide(
            Mode::UpdateBaselines,
            &spec(),
            &measurement(5000.0),
            &store,
            Tolerance::default(),
        );
        assert_eq!(outcome, Outcome::BaselineEstablished);
    }
}
