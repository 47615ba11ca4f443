//! Engine types
//!
//! Configuration and results for the paged fetcher.

use crate::http::RetryPolicy;
use crate::types::JsonValue;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Configuration for a paged fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Retry budget for each page
    pub retry: RetryPolicy,
    /// Pause between successful pages
    pub page_delay: Duration,
    /// Hard cap on pages accepted in one fetch
    pub max_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            page_delay: Duration::from_secs(1),
            max_pages: 1000,
        }
    }
}

impl FetchConfig {
    /// Create a new fetch config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set pause between pages
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set page cap
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// How a fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// The server signalled the end of the result set
    Completed,
    /// The server signalled the end and nothing was ever returned
    EmptyResult,
    /// Stopped early; whatever was gathered before stopping is kept
    PartialFailure,
}

impl FetchStatus {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Completed => "completed",
            FetchStatus::EmptyResult => "empty_result",
            FetchStatus::PartialFailure => "partial_failure",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a fetch gathered, plus how it ended
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Records in retrieval order, duplicates included
    pub records: Vec<JsonValue>,
    /// Terminal status
    pub status: FetchStatus,
    /// Pages accepted
    pub pages: usize,
    /// Requests sent, retries included
    pub requests: u32,
    /// Last failure detail, for partial failures
    pub failure: Option<String>,
}

impl FetchOutcome {
    /// Number of records gathered
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was gathered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the server confirmed the end of the result set
    pub fn is_complete(&self) -> bool {
        self.status != FetchStatus::PartialFailure
    }
}
