//! Durable baseline storage for the uxprobe harness.
//!
//! Baselines live in a single JSON document on disk, nested as
//! `{ check: { metric: { value, updated_at } } }`. Maps are `BTreeMap`s so
//! the file is stable-ordered and diff-friendly under version control.
//!
//! A missing file is a normal first-run state and loads as an empty store.
//! An unreadable or corrupt file is a [`StoreError::Read`]; callers that
//! want the fall-back-to-empty behavior use [`BaselineStore::load_lenient`],
//! which logs a loud warning since it can silently mask a real prior
//! baseline.
//!
//! Writes go through a temp file in the target directory followed by a
//! rename, so a crashed run never leaves a half-written store behind.
//! Concurrent writers for the same key are last-write-wins; serializing
//! baseline-update runs is the caller's responsibility.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use uxprobe_core::types::BaselineRecord;

/// Errors raised by the baseline store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The baseline file exists but could not be read or parsed.
    ///
    /// Distinct from a missing file, which is the normal first-run state.
    #[error("failed to read baseline store {path}: {reason}")]
    Read {
        /// Path of the store file.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The baseline file could not be persisted. Fatal for the run: without
    /// durable baseline state the harness cannot make a trustworthy
    /// pass/fail claim.
    #[error("failed to write baseline store {path}: {source}")]
    Write {
        /// Path of the store file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

type Records = BTreeMap<String, BTreeMap<String, BaselineRecord>>;

/// Key-value store mapping `(check, metric)` to the last-accepted value.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
    records: Records,
}

impl BaselineStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Records::new(),
        }
    }

    /// Load the store from disk. A missing file yields an empty store; a
    /// present-but-unreadable file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(path));
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };
        let records: Records = serde_json::from_str(&text).map_err(|e| StoreError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { path, records })
    }

    /// Load the store, falling back to an empty one when the file is
    /// corrupt. The fallback is logged loudly because it discards whatever
    /// baseline was there before.
    pub fn load_lenient(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    error = %e,
                    "baseline store unreadable; treating all checks as first-run"
                );
                Self::empty(path)
            }
        }
    }

    /// Where this store persists.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the record for one `(check, metric)` pair. Absence is the
    /// normal first-run state, not an error.
    pub fn get(&self, check: &str, metric: &str) -> Option<&BaselineRecord> {
        self.records.get(check)?.get(metric)
    }

    /// Write or overwrite a record, stamped with the current time.
    pub fn upsert(&mut self, check: &str, metric: &str, value: f64) {
        self.records
            .entry(check.to_string())
            .or_default()
            .insert(metric.to_string(), BaselineRecord::now(value));
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of `(check, metric)` records.
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    /// Iterate all records as `(check, metric, record)` triples, in key
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &BaselineRecord)> {
        self.records.iter().flat_map(|(check, metrics)| {
            metrics
                .iter()
                .map(move |(metric, record)| (check.as_str(), metric.as_str(), record))
        })
    }

    /// Persist the store atomically: write to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self) -> Result<()> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.records).map_err(|e| StoreError::Write {
            path: self.path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}
