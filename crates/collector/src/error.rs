// Copyright 2025 uxprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Collection failure taxonomy.
//!
//! Every variant is recoverable at the level of a single check: the check
//! is reported as errored and the rest of the run proceeds.

use thiserror::Error;

/// Errors that can occur while collecting one measurement.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The expected UI target never appeared within the wait window.
    ///
    /// A correctness failure of the application under test, never to be
    /// conflated with a tolerance regression.
    #[error("element not found: {selector} (waited {waited_ms}ms)")]
    ElementNotFound {
        /// The selector that never matched a visible element.
        selector: String,
        /// How long the collector waited before giving up.
        waited_ms: u64,
    },

    /// Navigation to the target URL failed.
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// The URL that was requested.
        url: String,
        /// What the browser reported.
        reason: String,
    },

    /// A blocking browser operation exceeded the check's wait budget.
    ///
    /// Distinct from [`CollectError::ElementNotFound`]: the element wait
    /// has its own bounded window, this covers navigation and property
    /// reads that hung.
    #[error("{operation} timed out after {waited_ms}ms")]
    Timeout {
        /// Which operation hung.
        operation: String,
        /// The wait budget that elapsed.
        waited_ms: u64,
    },

    /// A page-side expression failed to evaluate or did not yield a number.
    #[error("script evaluation failed: {reason}")]
    Script {
        /// What went wrong.
        reason: String,
    },

    /// The browser session itself failed (launch, protocol, teardown).
    #[error("browser error: {reason}")]
    Browser {
        /// What went wrong.
        reason: String,
    },
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectError>;
