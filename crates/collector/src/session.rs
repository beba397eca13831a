// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scoped browser session acquisition.
//!
//! Each check runs inside its own [`BrowserSession`]: a launched Chromium
//! process, the CDP event handler task servicing it, and one page. The
//! session must be torn down on every exit path; [`BrowserSession::close`]
//! does so in an orderly fashion, and `Drop` aborts the handler task so
//! that an early return or panic cannot leak browser processes across a
//! long suite run.

use crate::driver::ChromeDriver;
use crate::error::{CollectError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

/// Viewport used for all measurements, matching the desktop size the
/// original audits were captured at.
const VIEWPORT: (u32, u32) = (1440, 900);

/// One launched browser with a single attached page.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch a Chromium process and open a blank page.
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder().window_size(VIEWPORT.0, VIEWPORT.1);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|reason| CollectError::Browser { reason })?;

        let (browser, mut events) =
            Browser::launch(config)
                .await
                .map_err(|e| CollectError::Browser {
                    reason: e.to_string(),
                })?;

        // The handler stream must be pumped for the connection to make
        // progress; it ends when the browser goes away.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CollectError::Browser {
                reason: e.to_string(),
            })?;

        Ok(Self {
            browser,
            handler,
            page,
        })
    }

    /// A driver bound to this session's page.
    pub fn driver(&self) -> ChromeDriver {
        ChromeDriver::new(self.page.clone())
    }

    /// Orderly teardown: ask the browser to close, then stop the handler.
    /// Teardown failures are logged, not propagated; the measurement result
    /// is already decided by this point.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "browser wait failed");
        }
        self.handler.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Covers panics and early returns; `Browser`'s own drop kills the
        // child process if `close` never ran.
        self.handler.abort();
    }
}
