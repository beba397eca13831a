//! JSON summary artifact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uxprobe_core::RunSummary;

/// File name of the JSON artifact inside the report directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Write the run summary as pretty-printed JSON into `dir`, returning the
/// path written.
pub fn write_summary(summary: &RunSummary, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(&path, json)?;
    Ok(path)
}
