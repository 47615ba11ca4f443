// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # research-harvest
//!
//! Drains cursor-paginated result sets from a rate-limited research API and
//! stores them as raw JSON snapshots and flat CSV/Parquet exports.
//!
//! ## Features
//!
//! - **Paged fetching**: follow `cursor`/`search_id` until the server says stop
//! - **Bounded retries**: a fixed attempt budget per page, paced between attempts
//! - **Date windows**: long periods split into API-sized windows
//! - **Partial results**: a failed page never discards what was already fetched
//! - **Arrow output**: flattened rows written as CSV or Parquet
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use research_harvest::endpoint::{get_builtin, FetchRequest};
//! use research_harvest::engine::PagedFetcher;
//! use research_harvest::http::{HttpClient, HttpClientConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> research_harvest::Result<()> {
//!     let client = HttpClient::new(HttpClientConfig::default())?.with_token("...");
//!     let endpoint = Arc::new(get_builtin("reposted_videos").unwrap());
//!
//!     let fetcher = PagedFetcher::new(client);
//!     let outcome = fetcher.fetch_all(&FetchRequest::new(endpoint, "some_account")).await;
//!     println!("{} records ({})", outcome.len(), outcome.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  cli: Runner / Harvest   targets × windows, sequential        │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────┬───┴──────────┬───────────┬─────────┐
//! │ endpoint  │   engine     │  pagination  │ partition │ output  │
//! ├───────────┼──────────────┼──────────────┼───────────┼─────────┤
//! │ presets   │ PagedFetcher │ PageResult   │ 30-day    │ flatten │
//! │ body/URL  │ PageSource   │ cursor state │ windows   │ CSV     │
//! │           │ retry        │ error codes  │           │ Parquet │
//! └───────────┴──────────────┴──────────────┴───────────┴─────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Endpoint descriptors and request building
pub mod endpoint;

/// Page parsing and cursor state
pub mod pagination;

/// Date window routing
pub mod partition;

/// Paged fetch engine
pub mod engine;

/// Run configuration and target lists
pub mod config;

/// Flattening and CSV/Parquet/JSON output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{RunConfig, Target};
pub use endpoint::{Endpoint, FetchRequest};
pub use engine::{FetchOutcome, FetchStatus, PageSource, PagedFetcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
