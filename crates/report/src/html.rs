//! Static HTML report.
//!
//! A single self-contained page embedding the run summary as an inline
//! table, for manual review after a CI run. Not machine-parsed.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uxprobe_core::compare::Outcome;
use uxprobe_core::RunSummary;

/// File name of the HTML artifact inside the report directory.
pub const REPORT_FILE: &str = "report.html";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn row(out: &mut String, report: &uxprobe_core::CheckReport) {
    let (class, status, detail) = match &report.outcome {
        Outcome::Passed { allowed, margin } => (
            "pass",
            "pass".to_string(),
            format!("allowed {allowed:.1}, headroom {:.1}", -margin),
        ),
        Outcome::Failed { allowed, margin } => (
            "fail",
            "fail".to_string(),
            format!("allowed {allowed:.1}, over by {margin:.1}"),
        ),
        Outcome::BaselineEstablished => ("new", "new baseline".to_string(), String::new()),
        Outcome::Error { message } => ("err", "error".to_string(), escape(message)),
    };
    let observed = report
        .observed
        .map(|v| format!("{v:.1}{}", report.unit.suffix()))
        .unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "<tr class=\"{class}\"><td>{}</td><td>{observed}</td><td>{status}</td><td>{detail}</td></tr>",
        escape(&report.key()),
    )
    .unwrap();
}

/// Render the report page.
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>").unwrap();
    writeln!(out, "<html><head><meta charset=\"utf-8\">").unwrap();
    writeln!(out, "<title>uxprobe: {}</title>", escape(&summary.suite)).unwrap();
    writeln!(
        out,
        "<style>body{{font-family:sans-serif;margin:2em}}\
         table{{border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:4px 10px;text-align:left}}\
         tr.pass td{{background:#e8f5e9}}tr.fail td{{background:#ffebee}}\
         tr.new td{{background:#fffde7}}tr.err td{{background:#ffebee}}</style>"
    )
    .unwrap();
    writeln!(out, "</head><body>").unwrap();
    writeln!(
        out,
        "<h1>{} against {}</h1>",
        escape(&summary.suite),
        escape(&summary.base_url)
    )
    .unwrap();
    writeln!(
        out,
        "<p>Started {} &middot; tolerance {:.2}x &middot; \
         {} checks: {} passed, {} failed, {} new baselines, {} errors</p>",
        summary.started_at.to_rfc3339(),
        summary.tolerance,
        summary.total(),
        summary.passed(),
        summary.failed(),
        summary.established(),
        summary.errored(),
    )
    .unwrap();
    writeln!(
        out,
        "<table><tr><th>Check</th><th>Observed</th><th>Status</th><th>Detail</th></tr>"
    )
    .unwrap();
    for report in &summary.reports {
        row(&mut out, report);
    }
    writeln!(out, "</table></body></html>").unwrap();
    out
}

/// Write the report page into `dir`, returning the path written.
pub fn write_report(summary: &RunSummary, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE);
    fs::write(&path, render(summary))?;
    Ok(path)
}
