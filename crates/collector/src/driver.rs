// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! The browser control surface the probes run against.
//!
//! [`PageDriver`] is the narrow seam between probe logic and the browser:
//! navigate, wait for an element, read a DOM/CSS property. The production
//! implementation drives a Chromium page over the DevTools protocol;
//! tests substitute an in-memory fake.

use crate::error::{CollectError, Result};
use async_trait::async_trait;
use chromiumoxide::page::Page;
use std::time::Duration;
use tracing::trace;

/// Poll interval while waiting for an element to become visible.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Generic browser-automation control surface.
///
/// The harness is a pure observer of the application under test: it
/// navigates, waits and reads, but exposes no interface back.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and wait for the load event.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until at least one element matching `selector` is visible
    /// (non-zero layout box), or fail with
    /// [`CollectError::ElementNotFound`] after `timeout`.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Number of DOM nodes currently matching `selector`.
    async fn count_elements(&self, selector: &str) -> Result<u64>;

    /// Numeric pixel value of a computed CSS property on the first element
    /// matching `selector`.
    async fn computed_style_px(&self, selector: &str, property: &str) -> Result<f64>;

    /// Evaluate a page-side expression that yields a number.
    async fn eval_number(&self, expression: &str) -> Result<f64>;
}

/// [`PageDriver`] implementation over a Chromium page.
#[derive(Clone)]
pub struct ChromeDriver {
    page: Page,
}

impl ChromeDriver {
    /// Wrap an already-attached page.
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, expression: &str) -> Result<T> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| CollectError::Script {
                reason: e.to_string(),
            })?
            .into_value()
            .map_err(|e| CollectError::Script {
                reason: e.to_string(),
            })
    }
}

/// Quote a string for safe embedding in a page-side expression.
fn js_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        trace!(url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| CollectError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| CollectError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const r = el.getBoundingClientRect(); \
             return r.width > 0 && r.height > 0; }})()",
            sel = js_quote(selector)
        );

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.eval::<bool>(&expression).await.unwrap_or(false) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CollectError::ElementNotFound {
                    selector: selector.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn count_elements(&self, selector: &str) -> Result<u64> {
        let expression = format!(
            "document.querySelectorAll({sel}).length",
            sel = js_quote(selector)
        );
        self.eval(&expression).await
    }

    async fn computed_style_px(&self, selector: &str, property: &str) -> Result<f64> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return null; \
             return parseFloat(getComputedStyle(el).getPropertyValue({prop})); }})()",
            sel = js_quote(selector),
            prop = js_quote(property)
        );
        match self.eval::<Option<f64>>(&expression).await? {
            Some(value) if value.is_finite() => Ok(value),
            Some(value) => Err(CollectError::Script {
                reason: format!("property '{property}' is not a finite number: {value}"),
            }),
            None => Err(CollectError::ElementNotFound {
                selector: selector.to_string(),
                waited_ms: 0,
            }),
        }
    }

    async fn eval_number(&self, expression: &str) -> Result<f64> {
        let value: f64 = self.eval(expression).await?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CollectError::Script {
                reason: format!("expression did not yield a finite number: {value}"),
            })
        }
    }
}
