//! Reporters for uxprobe run summaries.
//!
//! - [`console`] - line-oriented text for CI log viewers
//! - [`json`] - the run summary as a pretty-printed JSON artifact
//! - [`html`] - a static, human-browsable report page
//!
//! File artifacts are diagnostic output, not the check result: writing
//! them is best-effort and a failure degrades to a console warning without
//! changing the run outcome.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod console;
pub mod html;
pub mod json;

use std::path::Path;
use tracing::warn;
use uxprobe_core::RunSummary;

/// Write the JSON and HTML artifacts for a finished run into `dir`.
///
/// Best-effort: each failed write is logged and skipped.
pub fn write_artifacts(summary: &RunSummary, dir: impl AsRef<Path>) {
    let dir = dir.as_ref();
    if let Err(e) = json::write_summary(summary, dir) {
        warn!(error = %e, "could not write JSON summary");
    }
    if let Err(e) = html::write_report(summary, dir) {
        warn!(error = %e, "could not write HTML report");
    }
}
