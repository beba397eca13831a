//! Line-oriented console output.
//!
//! One line per measurement plus a final aggregate line, in a shape CI log
//! viewers can grep: `PASS`/`FAIL`/`NEW`/`ERR` markers, observed value,
//! threshold and margin.

use colored::Colorize;
use uxprobe_core::compare::Outcome;
use uxprobe_core::summary::{CheckReport, RunSummary};
use uxprobe_core::types::MetricUnit;

fn fmt_value(value: f64, unit: MetricUnit) -> String {
    let suffix = unit.suffix();
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{value:.0}{suffix}")
    } else {
        format!("{value:.1}{suffix}")
    }
}

/// Render one finished check as a single line.
pub fn format_check(report: &CheckReport) -> String {
    let key = report.key();
    match &report.outcome {
        Outcome::Passed { allowed, margin } => format!(
            "{} {key}: {} (allowed {}, headroom {})",
            "PASS".green().bold(),
            fmt_value(report.observed.unwrap_or_default(), report.unit),
            fmt_value(*allowed, report.unit),
            fmt_value(-margin, report.unit),
        ),
        Outcome::Failed { allowed, margin } => {
            let over_pct = if *allowed > 0.0 {
                format!(" (+{:.1}% over threshold)", margin / allowed * 100.0)
            } else {
                String::new()
            };
            format!(
                "{} {key}: {} exceeds allowed {} by {}{over_pct}",
                "FAIL".red().bold(),
                fmt_value(report.observed.unwrap_or_default(), report.unit),
                fmt_value(*allowed, report.unit),
                fmt_value(*margin, report.unit),
            )
        }
        Outcome::BaselineEstablished => format!(
            "{} {key}: baseline established at {}",
            " NEW".yellow().bold(),
            fmt_value(report.observed.unwrap_or_default(), report.unit),
        ),
        Outcome::Error { message } => {
            format!("{} {key}: {message}", " ERR".red().bold())
        }
    }
}

/// Render the aggregate line for a finished run.
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{}: {} checks, {} passed, {} failed, {} new baselines, {} errors",
        if summary.is_success() {
            "OK".green().bold().to_string()
        } else {
            "REGRESSED".red().bold().to_string()
        },
        summary.total(),
        summary.passed(),
        summary.failed(),
        summary.established(),
        summary.errored(),
    )
}

/// Print one finished check.
pub fn print_check(report: &CheckReport) {
    println!("{}", format_check(report));
}

/// Print the aggregate line.
pub fn print_summary(summary: &RunSummary) {
    println!("{}", format_summary(summary));
}
