// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Probe execution: one check in, one measurement out.
//!
//! Steps run strictly in order (navigate, settle, measure) with no
//! internal concurrency; the only blocking operations are element waits
//! and the fixed settle delay, both bounded.

use crate::driver::PageDriver;
use crate::error::{CollectError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uxprobe_core::suite::{CheckSpec, ProbeSpec};
use uxprobe_core::types::Measurement;

/// Wait budgets for probe execution.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Wait budget for element visibility when the check does not override
    /// it.
    pub default_timeout: Duration,
    /// Fixed post-navigation settle before reading DOM/CSS properties,
    /// allowing reflow to finish.
    pub settle: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(10),
            settle: Duration::from_millis(250),
        }
    }
}

/// Executes one check's probe against a [`PageDriver`].
pub struct Collector<D> {
    driver: D,
    config: CollectorConfig,
}

impl<D: PageDriver> Collector<D> {
    /// A collector with default wait budgets.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, CollectorConfig::default())
    }

    /// A collector with explicit wait budgets.
    pub fn with_config(driver: D, config: CollectorConfig) -> Self {
        Self { driver, config }
    }

    /// Execute `check` against the application at `base_url` and produce
    /// its measurement.
    ///
    /// # Errors
    ///
    /// Any [`crate::CollectError`]; all are recoverable per check.
    pub async fn measure(&self, base_url: &str, check: &CheckSpec) -> Result<Measurement> {
        let url = join_url(base_url, check.probe.path());
        let timeout = check
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.config.default_timeout);

        debug!(check = %check.key(), %url, "running probe");

        // Every blocking step gets an explicit bound: the element wait has
        // its own window inside the driver, everything else is wrapped here
        // so a hung navigation or property read cannot stall the run.
        let observed = match &check.probe {
            ProbeSpec::Navigation { ready_selector, .. } => {
                let start = Instant::now();
                bounded(timeout, "navigation", self.driver.goto(&url)).await?;
                self.driver.wait_for_visible(ready_selector, timeout).await?;
                start.elapsed().as_secs_f64() * 1000.0
            }
            ProbeSpec::ElementCount { selector, .. } => {
                bounded(timeout, "navigation", self.driver.goto(&url)).await?;
                tokio::time::sleep(self.config.settle).await;
                bounded(timeout, "element count", self.driver.count_elements(selector)).await?
                    as f64
            }
            ProbeSpec::StyleValue {
                selector, property, ..
            } => {
                bounded(timeout, "navigation", self.driver.goto(&url)).await?;
                self.driver.wait_for_visible(selector, timeout).await?;
                bounded(
                    timeout,
                    "style read",
                    self.driver.computed_style_px(selector, property),
                )
                .await?
            }
            ProbeSpec::ScriptValue { expression, .. } => {
                bounded(timeout, "navigation", self.driver.goto(&url)).await?;
                tokio::time::sleep(self.config.settle).await;
                bounded(timeout, "script evaluation", self.driver.eval_number(expression)).await?
            }
        };

        debug!(check = %check.key(), observed, "probe complete");

        Ok(Measurement {
            check: check.name.clone(),
            metric: check.metric.clone(),
            observed,
            unit: check.unit,
        })
    }
}

/// Bound one browser operation by the check's wait budget.
async fn bounded<T>(
    timeout: Duration,
    operation: &str,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(CollectError::Timeout {
            operation: operation.to_string(),
            waited_ms: timeout.as_millis() as u64,
        }),
    }
}

/// Join the base URL and a check path without doubling slashes.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uxprobe_core::types::{Direction, MetricUnit};

    /// Scripted driver: records navigations and serves canned values.
    struct FakeDriver {
        visits: Mutex<Vec<String>>,
        goto_delay: Duration,
        visible_after: Duration,
        element_present: bool,
        count: u64,
        style_px: f64,
        script_value: f64,
    }

    impl Default for FakeDriver {
        fn default() -> Self {
            Self {
                visits: Mutex::new(Vec::new()),
                goto_delay: Duration::ZERO,
                visible_after: Duration::from_millis(20),
                element_present: true,
                count: 412,
                style_px: 48.0,
                script_value: 1234.5,
            }
        }
    }

    #[async_trait]
    impl PageDriver for FakeDriver {
        async fn goto(&self, url: &str) -> Result<()> {
            tokio::time::sleep(self.goto_delay).await;
            self.visits.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
            if !self.element_present {
                return Err(CollectError::ElementNotFound {
                    selector: selector.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.visible_after).await;
            Ok(())
        }

        async fn count_elements(&self, _selector: &str) -> Result<u64> {
            Ok(self.count)
        }

        async fn computed_style_px(&self, _selector: &str, _property: &str) -> Result<f64> {
            Ok(self.style_px)
        }

        async fn eval_number(&self, _expression: &str) -> Result<f64> {
            Ok(self.script_value)
        }
    }

    fn check(probe: ProbeSpec, unit: MetricUnit) -> CheckSpec {
        CheckSpec {
            name: "page-load".into(),
            metric: "initial_load_time".into(),
            unit,
            direction: Direction::LowerIsBetter,
            probe,
            tolerance: None,
            timeout_ms: None,
        }
    }

    fn fast_config() -> CollectorConfig {
        CollectorConfig {
            default_timeout: Duration::from_millis(500),
            settle: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_navigation_probe_measures_elapsed_ms() {
        let collector = Collector::with_config(FakeDriver::default(), fast_config());
        let spec = check(
            ProbeSpec::Navigation {
                path: "/".into(),
                ready_selector: "main".into(),
            },
            MetricUnit::Milliseconds,
        );

        let m = collector
            .measure("http://localhost:3000", &spec)
            .await
            .unwrap();
        assert_eq!(m.check, "page-load");
        assert_eq!(m.unit, MetricUnit::Milliseconds);
        // The fake becomes visible after 20ms; the timing must include it.
        assert!(m.observed >= 20.0, "observed {}", m.observed);
    }

    #[tokio::test]
    async fn test_element_count_probe() {
        let driver = FakeDriver::default();
        let collector = Collector::with_config(driver, fast_config());
        let spec = check(
            ProbeSpec::ElementCount {
                path: "/history".into(),
                selector: "table tr".into(),
            },
            MetricUnit::Count,
        );

        let m = collector
            .measure("http://localhost:3000/", &spec)
            .await
            .unwrap();
        assert_eq!(m.observed, 412.0);
    }

    #[tokio::test]
    async fn test_style_and_script_probes() {
        let collector = Collector::with_config(FakeDriver::default(), fast_config());

        let style = check(
            ProbeSpec::StyleValue {
                path: "/".into(),
                selector: "header".into(),
                property: "height".into(),
            },
            MetricUnit::Pixels,
        );
        assert_eq!(
            collector
                .measure("http://localhost:3000", &style)
                .await
                .unwrap()
                .observed,
            48.0
        );

        let script = check(
            ProbeSpec::ScriptValue {
                path: "/".into(),
                expression: "performance.now()".into(),
            },
            MetricUnit::Milliseconds,
        );
        assert_eq!(
            collector
                .measure("http://localhost:3000", &script)
                .await
                .unwrap()
                .observed,
            1234.5
        );
    }

    #[tokio::test]
    async fn test_missing_element_is_element_not_found() {
        let driver = FakeDriver {
            element_present: false,
            ..FakeDriver::default()
        };
        let collector = Collector::with_config(driver, fast_config());
        let spec = check(
            ProbeSpec::Navigation {
                path: "/history".into(),
                ready_selector: ".bp5-table".into(),
            },
            MetricUnit::Milliseconds,
        );

        let err = collector
            .measure("http://localhost:3000", &spec)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CollectError::ElementNotFound { ref selector, .. } if selector == ".bp5-table"
        ));
    }

    #[tokio::test]
    async fn test_hung_navigation_is_timeout() {
        let driver = FakeDriver {
            goto_delay: Duration::from_millis(200),
            ..FakeDriver::default()
        };
        let collector = Collector::with_config(driver, fast_config());
        let mut spec = check(
            ProbeSpec::ScriptValue {
                path: "/".into(),
                expression: "performance.now()".into(),
            },
            MetricUnit::Milliseconds,
        );
        spec.timeout_ms = Some(50);

        let err = collector
            .measure("http://localhost:3000", &spec)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CollectError::Timeout { ref operation, waited_ms: 50 } if operation == "navigation"
        ));
    }

    #[tokio::test]
    async fn test_url_join_avoids_double_slash() {
        let driver = FakeDriver::default();
        let collector = Collector::with_config(driver, fast_config());
        let spec = check(
            ProbeSpec::ElementCount {
                path: "/history".into(),
                selector: "tr".into(),
            },
            MetricUnit::Count,
        );

        collector
            .measure("http://localhost:3000/", &spec)
            .await
            .unwrap();
        let visits = collector.driver.visits.lock().unwrap();
        assert_eq!(visits.as_slice(), ["http://localhost:3000/history"]);
    }

    #[test]
    fn test_join_url_cases() {
        assert_eq!(join_url("http://x", "/a"), "http://x/a");
        assert_eq!(join_url("http://x/", "a"), "http://x/a");
        assert_eq!(join_url("http://x/", "/"), "http://x/");
    }
}
