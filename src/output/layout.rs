//! Output directory layout
//!
//! ```text
//! <root>/raw/<dataset>/<YYYY-MM-DD>/<identity>[_<start>_to_<end>]_<timestamp>.json
//! <root>/processed/<dataset>/<stem>_<timestamp>.<ext>
//! ```
//!
//! The timestamp is fixed when the layout is created, so every file of one
//! run shares it.

use super::writer::ExportFormat;
use crate::error::Result;
use crate::partition::TimeWindow;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Paths for one run's raw snapshots and exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    dataset: String,
    started: NaiveDateTime,
}

impl OutputLayout {
    /// Layout for a run starting now (local time)
    pub fn new(root: impl Into<PathBuf>, dataset: &str) -> Self {
        Self::at(root, dataset, Local::now().naive_local())
    }

    /// Layout for a run started at a given time
    pub fn at(root: impl Into<PathBuf>, dataset: &str, started: NaiveDateTime) -> Self {
        Self {
            root: root.into(),
            dataset: sanitize_file_component(dataset),
            started,
        }
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run timestamp as used in file names
    pub fn timestamp(&self) -> String {
        self.started.format(RUN_TIMESTAMP_FORMAT).to_string()
    }

    /// `<root>/raw/<dataset>/<YYYY-MM-DD>`
    pub fn raw_dir(&self) -> PathBuf {
        self.root
            .join("raw")
            .join(&self.dataset)
            .join(self.started.format("%Y-%m-%d").to_string())
    }

    /// `<root>/processed/<dataset>`
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed").join(&self.dataset)
    }

    /// Create both directories
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.raw_dir())?;
        fs::create_dir_all(self.processed_dir())?;
        Ok(())
    }

    /// Raw snapshot for one identity, optionally one window
    pub fn raw_snapshot_path(&self, identity: &str, window: Option<&TimeWindow>) -> PathBuf {
        let identity = sanitize_file_component(identity);
        let name = match window {
            Some(w) => format!(
                "{identity}_{}_to_{}_{}.json",
                w.start_param(),
                w.end_param(),
                self.timestamp()
            ),
            None => format!("{identity}_{}.json", self.timestamp()),
        };
        self.raw_dir().join(name)
    }

    /// Raw snapshot combining every window of one identity
    pub fn combined_snapshot_path(&self, identity: &str) -> PathBuf {
        let identity = sanitize_file_component(identity);
        self.raw_dir()
            .join(format!("{identity}_all_{}.json", self.timestamp()))
    }

    /// Tabular export named after `stem`
    pub fn export_path(&self, stem: &str, format: ExportFormat) -> PathBuf {
        self.processed_dir().join(format!(
            "{}_{}.{}",
            sanitize_file_component(stem),
            self.timestamp(),
            format.extension()
        ))
    }
}

/// Make a string safe to use as part of a file name
pub fn sanitize_file_component(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}
