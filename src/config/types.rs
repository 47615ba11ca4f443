//! Run configuration
//!
//! Everything a harvest run needs besides the access token, loaded from a
//! YAML or JSON file. Every field has a default, so an empty file is a valid
//! (if not very useful) configuration.

use crate::endpoint::{get_builtin, list_builtin, Endpoint};
use crate::engine::FetchConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::output::ExportFormat;
use crate::partition::{parse_date, DateWindowRouter, TimeWindow, DEFAULT_WINDOW_DAYS};
use crate::types::{BackoffType, JsonValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// ============================================================================
// Top-Level Run Config
// ============================================================================

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Built-in dataset name (e.g., "videos")
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Targets: a file path, or the target list inline
    #[serde(default)]
    pub targets: Option<TargetSource>,

    /// Key under which the target mapping is nested
    #[serde(default)]
    pub group: Option<String>,

    /// Override the dataset's endpoint URL
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Override the dataset's field list
    #[serde(default)]
    pub fields: Option<FieldList>,

    /// Calendar year to harvest
    #[serde(default)]
    pub year: Option<i32>,

    /// Explicit range start (inclusive)
    #[serde(default)]
    pub start: Option<String>,

    /// Explicit range end (inclusive)
    #[serde(default)]
    pub end: Option<String>,

    /// Longest query window in days
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Override the dataset's page size
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Root of the raw and processed trees
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tabular export format
    #[serde(default)]
    pub format: ExportFormat,

    /// Also write one export per identity
    #[serde(default)]
    pub split_exports: bool,

    /// Fields holding unix timestamps to render as dates
    #[serde(default = "default_timestamp_fields")]
    pub timestamp_fields: Vec<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Retry and pacing settings
    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            targets: None,
            group: None,
            endpoint_url: None,
            fields: None,
            year: None,
            start: None,
            end: None,
            window_days: default_window_days(),
            page_size: None,
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
            split_exports: false,
            timestamp_fields: default_timestamp_fields(),
            http: HttpSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

fn default_dataset() -> String {
    "videos".to_string()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timestamp_fields() -> Vec<String> {
    vec!["create_time".to_string()]
}

/// Where the targets come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSource {
    /// Path to a JSON or YAML targets file
    File(PathBuf),
    /// Targets written directly in the run config
    Inline(JsonValue),
}

/// Field list written either as a sequence or as one comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldList {
    List(Vec<String>),
    Joined(String),
}

impl FieldList {
    fn as_slice(&self) -> Vec<&str> {
        match self {
            FieldList::List(fields) => fields.iter().map(String::as_str).collect(),
            FieldList::Joined(fields) => vec![fields.as_str()],
        }
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Request ceiling; `null` disables the limiter
    #[serde(default = "default_rps")]
    pub requests_per_second: Option<u32>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            requests_per_second: default_rps(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[allow(clippy::unnecessary_wraps)]
fn default_rps() -> Option<u32> {
    Some(5)
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Retry budget and pauses, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Attempts per page, the first one included
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How the retry delay grows
    #[serde(default)]
    pub backoff: BackoffType,

    /// Pause between pages
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause between date windows
    #[serde(default = "default_window_delay_ms")]
    pub window_delay_ms: u64,

    /// Pause between identities
    #[serde(default = "default_identity_delay_ms")]
    pub identity_delay_ms: u64,

    /// Page cap per fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff: BackoffType::default(),
            page_delay_ms: default_page_delay_ms(),
            window_delay_ms: default_window_delay_ms(),
            identity_delay_ms: default_identity_delay_ms(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    3000
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_window_delay_ms() -> u64 {
    1000
}

fn default_identity_delay_ms() -> u64 {
    2000
}

fn default_max_pages() -> usize {
    1000
}

impl FetchSettings {
    /// Retry policy for a single page
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
        .with_backoff(self.backoff, RetryPolicy::default().max_delay)
    }

    /// Pause between date windows
    pub fn window_delay(&self) -> Duration {
        Duration::from_millis(self.window_delay_ms)
    }

    /// Pause between identities
    pub fn identity_delay(&self) -> Duration {
        Duration::from_millis(self.identity_delay_ms)
    }
}

// ============================================================================
// Loading
// ============================================================================

impl RunConfig {
    /// Load a run config; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;

        if is_json_path(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML run config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse run config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON run config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse run config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.window_days == 0 || self.window_days > DEFAULT_WINDOW_DAYS {
            return Err(Error::invalid_value(
                "window_days",
                format!("must be between 1 and {DEFAULT_WINDOW_DAYS}"),
            ));
        }
        if self.fetch.retry_attempts == 0 {
            return Err(Error::invalid_value(
                "fetch.retry_attempts",
                "must be at least 1",
            ));
        }
        if self.fetch.max_pages == 0 {
            return Err(Error::invalid_value("fetch.max_pages", "must be at least 1"));
        }
        if self.page_size == Some(0) {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.http.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "http.requests_per_second",
                "must be at least 1, or null to disable",
            ));
        }
        if self.year.is_some() && (self.start.is_some() || self.end.is_some()) {
            return Err(Error::config("Set either 'year' or 'start'/'end', not both"));
        }
        Ok(())
    }

    /// Resolve the dataset into an endpoint, applying URL/field/page overrides
    pub fn endpoint(&self) -> Result<Endpoint> {
        let mut endpoint = get_builtin(&self.dataset).ok_or_else(|| Error::UnknownDataset {
            name: self.dataset.clone(),
        })?;

        if let Some(url) = &self.endpoint_url {
            endpoint = endpoint.with_url(url);
        }
        if let Some(fields) = &self.fields {
            endpoint = endpoint.with_fields(fields.as_slice());
        }
        if let Some(page_size) = self.page_size {
            endpoint = endpoint.with_page_size(page_size);
        }

        // surface a bad URL now, before any request
        endpoint.request_url()?;
        Ok(endpoint)
    }

    /// Date windows for the run, or `None` when the dataset is not windowed.
    ///
    /// A windowed dataset needs either `year` or both `start` and `end`.
    pub fn windows(&self, endpoint: &Endpoint, today: NaiveDate) -> Result<Option<Vec<TimeWindow>>> {
        let has_range = self.year.is_some() || self.start.is_some() || self.end.is_some();

        if !endpoint.windowed {
            if has_range {
                warn!(
                    "Dataset '{}' does not take a date range; ignoring year/start/end",
                    endpoint.name
                );
            }
            return Ok(None);
        }

        let router = match (self.year, &self.start, &self.end) {
            (Some(year), _, _) => DateWindowRouter::for_year(year, today, self.window_days)?,
            (None, Some(start), Some(end)) => {
                DateWindowRouter::new(parse_date(start)?, parse_date(end)?, self.window_days)?
            }
            (None, Some(_), None) => return Err(Error::missing_field("end")),
            (None, None, Some(_)) => return Err(Error::missing_field("start")),
            (None, None, None) => {
                return Err(Error::config(format!(
                    "Dataset '{}' needs a 'year' or a 'start'/'end' range",
                    endpoint.name
                )))
            }
        };

        Ok(Some(router.windows()))
    }

    /// Fetch configuration for the paged fetcher
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_retry(self.fetch.retry_policy())
            .with_page_delay(Duration::from_millis(self.fetch.page_delay_ms))
            .with_max_pages(self.fetch.max_pages)
    }

    /// HTTP client configuration
    pub fn http_client_config(&self) -> HttpClientConfig {
        let builder =
            HttpClientConfig::builder().timeout(Duration::from_secs(self.http.timeout_seconds));

        match self.http.requests_per_second {
            Some(rps) => builder.rate_limit(RateLimiterConfig::per_second(rps)),
            None => builder.no_rate_limit(),
        }
        .build()
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Names of the datasets a run config may use
pub fn available_datasets() -> Vec<String> {
    list_builtin().into_iter().map(|e| e.name).collect()
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!("Failed to read '{}': {e}", path.display()))
        }
    })
}

/// Read a JSON or YAML document into a JSON value, keeping key order
pub(crate) fn read_structured(path: &Path) -> Result<JsonValue> {
    let content = read_file(path)?;

    if is_json_path(path) {
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid JSON in '{}': {e}", path.display())))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid YAML in '{}': {e}", path.display())))
    }
}
