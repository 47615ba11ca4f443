//! Harvest driver
//!
//! Runs every target through every date window, one fetch at a time, and
//! writes what comes back. Nothing here aborts a run: a partial fetch keeps its
//! records, and a failed write is logged and skipped.

use crate::config::{RunConfig, Target};
use crate::endpoint::{Endpoint, FetchRequest};
use crate::engine::{FetchOutcome, FetchStatus, PageSource, PagedFetcher};
use crate::error::Result;
use crate::http::HttpClient;
use crate::output::{flatten_records, write_json_snapshot, write_rows, ExportFormat, OutputLayout};
use crate::partition::TimeWindow;
use crate::types::JsonValue;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Per-target result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    /// Account handle
    pub username: String,
    /// Partial if any window was partial, else empty if nothing came back
    pub status: FetchStatus,
    /// Records across all windows
    pub records: usize,
    /// Requests sent, retries included
    pub requests: u32,
    /// Windows that ended in a partial failure
    pub partial_windows: usize,
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Dataset name
    pub dataset: String,
    /// Targets processed
    pub identities: usize,
    /// Targets whose fetches all completed with data
    pub completed: usize,
    /// Targets that returned nothing
    pub empty: usize,
    /// Targets with at least one partial fetch
    pub partial: usize,
    /// Records gathered
    pub records: usize,
    /// Files written
    pub files: Vec<PathBuf>,
    /// Writes that failed
    pub write_failures: usize,
    /// Per-target detail, in run order
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    /// Whether every target finished without a partial failure or a failed write
    pub fn is_clean(&self) -> bool {
        self.partial == 0 && self.write_failures == 0
    }

    fn record(&mut self, target: TargetSummary) {
        self.identities += 1;
        self.records += target.records;
        match target.status {
            FetchStatus::Completed => self.completed += 1,
            FetchStatus::EmptyResult => self.empty += 1,
            FetchStatus::PartialFailure => self.partial += 1,
        }
        self.targets.push(target);
    }
}

/// Drives a whole run over a page source
pub struct Harvest<S = HttpClient> {
    fetcher: PagedFetcher<S>,
    endpoint: Arc<Endpoint>,
    windows: Option<Vec<TimeWindow>>,
    layout: OutputLayout,
    format: ExportFormat,
    split_exports: bool,
    timestamp_fields: Vec<String>,
    window_delay: Duration,
    identity_delay: Duration,
}

impl<S: PageSource> Harvest<S> {
    /// Resolve endpoint, windows and pacing from a run config.
    ///
    /// Fails before any request when the dataset, URL or date range is unusable.
    pub fn from_config(source: S, config: &RunConfig, today: NaiveDate) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let windows = config.windows(&endpoint, today)?;
        let layout = OutputLayout::new(&config.output_dir, &endpoint.name);

        Ok(Self {
            fetcher: PagedFetcher::new(source).with_config(config.fetch_config()),
            endpoint: Arc::new(endpoint),
            windows,
            layout,
            format: config.format,
            split_exports: config.split_exports,
            timestamp_fields: config.timestamp_fields.clone(),
            window_delay: config.fetch.window_delay(),
            identity_delay: config.fetch.identity_delay(),
        })
    }

    /// Replace the output layout
    #[must_use]
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Output layout in use
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Date windows per target, `None` when the dataset is not windowed
    pub fn windows(&self) -> Option<&[TimeWindow]> {
        self.windows.as_deref()
    }

    /// Harvest every target, strictly one after another
    pub async fn run(&self, targets: &[Target]) -> RunSummary {
        let mut summary = RunSummary {
            dataset: self.endpoint.name.clone(),
            ..RunSummary::default()
        };
        let mut all_rows: Vec<JsonValue> = Vec::new();

        if let Err(e) = self.layout.ensure_dirs() {
            error!("Failed to create output directories: {e}");
            summary.write_failures += 1;
        }

        for (i, target) in targets.iter().enumerate() {
            if i > 0 && !self.identity_delay.is_zero() {
                tokio::time::sleep(self.identity_delay).await;
            }

            info!(
                "Fetching {} for {} [{}/{}]",
                self.endpoint.name,
                target.label(),
                i + 1,
                targets.len()
            );
            let (target_summary, records) = self.harvest_target(target, &mut summary).await;

            if !records.is_empty() {
                let rows = flatten_records(&records, target, &self.timestamp_fields);
                if self.split_exports {
                    let path = self.layout.export_path(&target.username, self.format);
                    self.export(&path, &rows, &mut summary);
                }
                all_rows.extend(rows);
            }

            info!(
                "Finished {}: {} records ({})",
                target.username, target_summary.records, target_summary.status
            );
            summary.record(target_summary);
        }

        if all_rows.is_empty() {
            info!("No records gathered; skipping export");
        } else {
            let path = self.layout.export_path(&self.endpoint.name, self.format);
            self.export(&path, &all_rows, &mut summary);
        }

        summary
    }

    async fn harvest_target(
        &self,
        target: &Target,
        summary: &mut RunSummary,
    ) -> (TargetSummary, Vec<JsonValue>) {
        let windows: Vec<Option<TimeWindow>> = match &self.windows {
            Some(windows) => windows.iter().copied().map(Some).collect(),
            None => vec![None],
        };

        let mut records = Vec::new();
        let mut requests = 0;
        let mut partial_windows = 0;
        let mut windows_with_data = 0;

        for (j, window) in windows.iter().enumerate() {
            if j > 0 && !self.window_delay.is_zero() {
                tokio::time::sleep(self.window_delay).await;
            }

            let mut request = FetchRequest::new(Arc::clone(&self.endpoint), &target.username);
            if let Some(window) = window {
                request = request.with_window(*window);
            }

            let outcome = self.fetcher.fetch_all(&request).await;
            log_outcome(&request, &outcome);
            requests += outcome.requests;

            if outcome.status == FetchStatus::PartialFailure {
                partial_windows += 1;
            }

            if !outcome.is_empty() {
                windows_with_data += 1;
                let path = self
                    .layout
                    .raw_snapshot_path(&target.username, window.as_ref());
                self.snapshot(&path, &outcome.records, summary);
                records.extend(outcome.records);
            }
        }

        if windows_with_data > 1 {
            let path = self.layout.combined_snapshot_path(&target.username);
            self.snapshot(&path, &records, summary);
        }

        let status = if partial_windows > 0 {
            FetchStatus::PartialFailure
        } else if records.is_empty() {
            FetchStatus::EmptyResult
        } else {
            FetchStatus::Completed
        };

        let target_summary = TargetSummary {
            username: target.username.clone(),
            status,
            records: records.len(),
            requests,
            partial_windows,
        };
        (target_summary, records)
    }

    fn snapshot(&self, path: &Path, records: &[JsonValue], summary: &mut RunSummary) {
        match write_json_snapshot(path, records) {
            Ok(()) => {
                info!("Saved {} raw records to {}", records.len(), path.display());
                summary.files.push(path.to_path_buf());
            }
            Err(e) => {
                error!("Failed to write {}: {e}", path.display());
                summary.write_failures += 1;
            }
        }
    }

    fn export(&self, path: &Path, rows: &[JsonValue], summary: &mut RunSummary) {
        match write_rows(path, rows, self.format) {
            Ok(written) => {
                info!("Exported {written} rows to {}", path.display());
                summary.files.push(path.to_path_buf());
            }
            Err(e) => {
                error!("Failed to export {}: {e}", path.display());
                summary.write_failures += 1;
            }
        }
    }
}

fn log_outcome(request: &FetchRequest, outcome: &FetchOutcome) {
    match outcome.status {
        FetchStatus::Completed => info!(
            "Retrieved {} records for {} in {} pages",
            outcome.len(),
            request.describe(),
            outcome.pages
        ),
        FetchStatus::EmptyResult => info!("No records for {}", request.describe()),
        FetchStatus::PartialFailure => warn!(
            "Incomplete data for {}: kept {} records ({})",
            request.describe(),
            outcome.len(),
            outcome.failure.as_deref().unwrap_or("unknown failure")
        ),
    }
}

impl<S> std::fmt::Debug for Harvest<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvest")
            .field("endpoint", &self.endpoint.name)
            .field("windows", &self.windows.as_ref().map(Vec::len))
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
