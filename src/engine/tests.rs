//! Tests for engine module

use super::*;
use crate::endpoint::{get_builtin, FetchRequest};
use crate::error::Error;
use crate::http::RetryPolicy;
use crate::types::JsonValue;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Replays a fixed sequence of page results and records every request
struct ScriptedSource {
    script: Mutex<VecDeque<Result<PageResult>>>,
    seen: Mutex<Vec<FetchRequest>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<PageResult>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<FetchRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<PageResult> {
        self.seen.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PageResult::default()))
    }
}

/// Always answers with the same page
struct RepeatingSource(PageResult);

#[async_trait]
impl PageSource for RepeatingSource {
    async fn fetch_page(&self, _request: &FetchRequest) -> Result<PageResult> {
        Ok(self.0.clone())
    }
}

fn page(ids: &[i64], cursor: Option<JsonValue>, has_more: bool) -> PageResult {
    PageResult {
        records: ids.iter().map(|id| json!({"id": id})).collect(),
        cursor,
        has_more,
        search_id: None,
    }
}

fn request() -> FetchRequest {
    FetchRequest::new(Arc::new(get_builtin("videos").unwrap()), "partido_x")
}

fn server_error() -> Result<PageResult> {
    Err(Error::http_status(500, "internal"))
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_pages_accumulate_in_order() {
    let source = ScriptedSource::new(vec![
        Ok(page(&[1, 2], Some(json!("c1")), true)),
        Ok(page(&[3], None, false)),
    ]);
    let fetcher = PagedFetcher::new(source);
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(
        outcome.records,
        vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]
    );
    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.requests, 2);
    assert!(outcome.failure.is_none());
    // one inter-page pause
    assert_eq!(start.elapsed(), Duration::from_secs(1));

    let seen = fetcher.source().seen();
    assert_eq!(seen[0].cursor, None);
    assert_eq!(seen[1].cursor, Some(json!("c1")));
    assert_eq!(seen[1].identity, "partido_x");
}

#[tokio::test(start_paused = true)]
async fn test_single_page_without_more_does_not_pause() {
    let fetcher = PagedFetcher::new(ScriptedSource::new(vec![Ok(page(
        &[1],
        Some(json!("c1")),
        false,
    ))]));
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(outcome.len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_more_flag_without_cursor_stops() {
    let fetcher = PagedFetcher::new(ScriptedSource::new(vec![Ok(page(&[1, 2], None, true))]));

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(outcome.len(), 2);
    assert_eq!(outcome.requests, 1);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_returned_is_empty_result() {
    let fetcher = PagedFetcher::new(ScriptedSource::new(vec![Ok(page(&[], None, false))]));

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::EmptyResult);
    assert!(outcome.is_empty());
    assert!(outcome.is_complete());
    assert_eq!(outcome.pages, 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_page_with_more_keeps_going() {
    let source = ScriptedSource::new(vec![
        Ok(page(&[], Some(json!(100)), true)),
        Ok(page(&[7], None, false)),
    ]);
    let fetcher = PagedFetcher::new(source);

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(outcome.records, vec![json!({"id": 7})]);
    assert_eq!(fetcher.source().seen()[1].cursor, Some(json!(100)));
}

#[tokio::test(start_paused = true)]
async fn test_search_id_is_echoed_on_later_pages() {
    let mut first = page(&[1], Some(json!(100)), true);
    first.search_id = Some("s-42".to_string());
    let source = ScriptedSource::new(vec![
        Ok(first),
        Ok(page(&[2], Some(json!(200)), true)),
        Ok(page(&[3], None, false)),
    ]);
    let fetcher = PagedFetcher::new(source);

    let outcome = fetcher.fetch_all(&request()).await;
    assert_eq!(outcome.len(), 3);

    let seen = fetcher.source().seen();
    assert_eq!(seen[0].search_id, None);
    assert_eq!(seen[1].search_id, Some("s-42".to_string()));
    assert_eq!(seen[2].search_id, Some("s-42".to_string()));
    assert_eq!(seen[2].body()["cursor"], json!(200));
}

#[tokio::test(start_paused = true)]
async fn test_starting_cursor_is_honoured() {
    let fetcher = PagedFetcher::new(ScriptedSource::new(vec![Ok(page(&[9], None, false))]));
    let resumed = request().next_page(Some(json!(500)), Some("s-1".to_string()));

    fetcher.fetch_all(&resumed).await;

    let seen = fetcher.source().seen();
    assert_eq!(seen[0].cursor, Some(json!(500)));
    assert_eq!(seen[0].search_id, Some("s-1".to_string()));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_persistent_failure_is_partial_after_three_attempts() {
    let source = ScriptedSource::new(vec![server_error(), server_error(), server_error()]);
    let fetcher = PagedFetcher::new(source);
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::PartialFailure);
    assert!(outcome.is_empty());
    assert!(!outcome.is_complete());
    assert_eq!(outcome.requests, 3);
    assert_eq!(outcome.pages, 0);
    // delays between attempts only
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    assert!(outcome.failure.unwrap().contains("3 attempts"));
}

#[tokio::test(start_paused = true)]
async fn test_mid_fetch_failure_keeps_gathered_records() {
    let source = ScriptedSource::new(vec![
        Ok(page(&[1, 2], Some(json!("c1")), true)),
        server_error(),
        server_error(),
        server_error(),
    ]);
    let fetcher = PagedFetcher::new(source);

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::PartialFailure);
    assert_eq!(outcome.records, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(outcome.pages, 1);
    assert_eq!(outcome.requests, 4);
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_and_resends_same_cursor() {
    let source = ScriptedSource::new(vec![
        Ok(page(&[1], Some(json!("c1")), true)),
        server_error(),
        Ok(page(&[2], None, false)),
    ]);
    let fetcher = PagedFetcher::new(source);
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(outcome.len(), 2);
    assert_eq!(outcome.requests, 3);
    // page pause + one retry delay
    assert_eq!(start.elapsed(), Duration::from_secs(4));

    let seen = fetcher.source().seen();
    assert_eq!(seen[1].cursor, Some(json!("c1")));
    assert_eq!(seen[2].cursor, Some(json!("c1")));
}

#[tokio::test(start_paused = true)]
async fn test_api_error_code_is_retried_like_any_failure() {
    let source = ScriptedSource::new(vec![
        Err(Error::api("rate_limit_exceeded", "slow down", "log-1")),
        Ok(page(&[1], None, false)),
    ]);
    let fetcher = PagedFetcher::new(source);

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::Completed);
    assert_eq!(outcome.requests, 2);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_is_not_retried() {
    let source = ScriptedSource::new(vec![Err(Error::invalid_value("url", "no host"))]);
    let fetcher = PagedFetcher::new(source);

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::PartialFailure);
    assert_eq!(outcome.requests, 1);
}

#[tokio::test(start_paused = true)]
async fn test_page_cap_ends_endless_result_set() {
    let fetcher = PagedFetcher::new(RepeatingSource(page(&[1], Some(json!("same")), true)))
        .with_config(FetchConfig::new().with_max_pages(5));
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::PartialFailure);
    assert_eq!(outcome.pages, 5);
    assert_eq!(outcome.requests, 5);
    assert_eq!(outcome.len(), 5);
    assert_eq!(outcome.failure, Some("page limit of 5 reached".to_string()));
    // four pauses between five pages, none after the last
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_page_cap_of_one_stops_without_pausing() {
    let fetcher = PagedFetcher::new(RepeatingSource(page(&[1], Some(json!("c")), true)))
        .with_config(FetchConfig::new().with_max_pages(1));
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.status, FetchStatus::PartialFailure);
    assert_eq!(outcome.pages, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_custom_config_changes_pacing() {
    let config = FetchConfig::new()
        .with_retry(RetryPolicy::fixed(2, Duration::from_millis(250)))
        .with_page_delay(Duration::from_millis(10));
    let source = ScriptedSource::new(vec![server_error(), server_error()]);
    let fetcher = PagedFetcher::new(source).with_config(config);
    let start = Instant::now();

    let outcome = fetcher.fetch_all(&request()).await;

    assert_eq!(outcome.requests, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_repeated_fetch_yields_same_records() {
    let fetcher = PagedFetcher::new(RepeatingSource(page(&[1, 2, 3], None, false)));

    let first = fetcher.fetch_all(&request()).await;
    let second = fetcher.fetch_all(&request()).await;

    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_page_does_not_retry() {
    let fetcher = PagedFetcher::new(ScriptedSource::new(vec![server_error()]));

    let err = fetcher.fetch_page(&request()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(fetcher.source().seen().len(), 1);
}

#[test]
fn test_fetch_config_defaults() {
    let config = FetchConfig::default();
    assert_eq!(config.retry, RetryPolicy::default());
    assert_eq!(config.page_delay, Duration::from_secs(1));
    assert_eq!(config.max_pages, 1000);
}

#[test]
fn test_fetch_status_names() {
    assert_eq!(FetchStatus::Completed.to_string(), "completed");
    assert_eq!(FetchStatus::EmptyResult.as_str(), "empty_result");
    assert_eq!(
        serde_json::to_value(FetchStatus::PartialFailure).unwrap(),
        json!("partial_failure")
    );
}
