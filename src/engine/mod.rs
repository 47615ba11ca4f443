//! Execution engine module
//!
//! Drains a cursor-paginated result set into memory.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PageSource` - anything that can fetch one page for a request
//! - `PagedFetcher` - the loop: retry each page, follow the cursor, pace requests
//! - `FetchOutcome` - the accumulated records and how the fetch ended
//!
//! Fetches are strictly sequential: page N+1 is never requested before the
//! outcome of page N is known.

mod types;

pub use types::{FetchConfig, FetchOutcome, FetchStatus};

use crate::endpoint::FetchRequest;
use crate::error::Result;
use crate::http::{retry, HttpClient, RequestConfig};
use crate::pagination::{NextPage, PageResult, PaginationState};
use async_trait::async_trait;
use tracing::{debug, info, info_span, warn, Instrument};

/// Something that can fetch a single page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch exactly one page; no retries, no local state
    async fn fetch_page(&self, request: &FetchRequest) -> Result<PageResult>;
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<PageResult> {
        let url = request.url()?;
        let body = self
            .post_json(&url, RequestConfig::new().json(request.body()))
            .await?;
        PageResult::parse(&body, &request.endpoint.records)
    }
}

/// Paged fetcher over a page source
pub struct PagedFetcher<S = HttpClient> {
    source: S,
    config: FetchConfig,
}

impl<S: PageSource> PagedFetcher<S> {
    /// Create a fetcher with the default configuration
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: FetchConfig::default(),
        }
    }

    /// Set fetch configuration
    #[must_use]
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the fetch configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Get the underlying page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one page, once
    pub async fn fetch_page(&self, request: &FetchRequest) -> Result<PageResult> {
        self.source.fetch_page(request).await
    }

    /// Fetch every page for the request, starting from its continuation values.
    ///
    /// Never fails: an exhausted retry budget or the page cap ends the fetch
    /// with [`FetchStatus::PartialFailure`] and the records gathered so far.
    pub async fn fetch_all(&self, request: &FetchRequest) -> FetchOutcome {
        let span = info_span!(
            "fetch",
            endpoint = %request.endpoint.name,
            identity = %request.describe()
        );
        self.drain(request).instrument(span).await
    }

    async fn drain(&self, request: &FetchRequest) -> FetchOutcome {
        let mut state = PaginationState::new();
        let mut records = Vec::new();
        let mut requests: u32 = 0;
        let mut current = request.clone();

        loop {
            let result = retry(&self.config.retry, |_| {
                requests += 1;
                self.source.fetch_page(&current)
            })
            .await;

            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Failed to retrieve page {} for {}: {e}; keeping {} records",
                        state.pages + 1,
                        request.describe(),
                        records.len()
                    );
                    return FetchOutcome {
                        records,
                        status: FetchStatus::PartialFailure,
                        pages: state.pages,
                        requests,
                        failure: Some(e.to_string()),
                    };
                }
            };

            let next = state.advance(&page);
            if page.is_empty() {
                info!("No records in page {}", state.pages);
            } else {
                debug!(
                    "Page {}: {} records, {} so far",
                    state.pages,
                    page.len(),
                    records.len() + page.len()
                );
            }
            records.extend(page.records);

            match next {
                NextPage::Continue { .. } if state.pages >= self.config.max_pages => {
                    warn!(
                        "Stopping after {} pages without an end-of-data signal; keeping {} records",
                        state.pages,
                        records.len()
                    );
                    return FetchOutcome {
                        records,
                        status: FetchStatus::PartialFailure,
                        pages: state.pages,
                        requests,
                        failure: Some(format!("page limit of {} reached", self.config.max_pages)),
                    };
                }
                NextPage::Continue { cursor, search_id } => {
                    debug!("Pausing {:?} before next page", self.config.page_delay);
                    tokio::time::sleep(self.config.page_delay).await;
                    current = request.next_page(Some(cursor), search_id);
                }
                NextPage::Done => break,
            }
        }

        let status = if records.is_empty() {
            FetchStatus::EmptyResult
        } else {
            FetchStatus::Completed
        };
        info!(
            "Fetched {} records in {} pages ({status})",
            records.len(),
            state.pages
        );

        FetchOutcome {
            records,
            status,
            pages: state.pages,
            requests,
            failure: None,
        }
    }
}

impl<S> std::fmt::Debug for PagedFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
