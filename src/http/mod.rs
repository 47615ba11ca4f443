//! HTTP client module
//!
//! Provides the HTTP client, request ceiling, and retry combinator.
//!
//! # Features
//!
//! - **Single-shot requests**: one authenticated POST per call, classified by status
//! - **Rate Limiting**: Token bucket ceiling using governor
//! - **Bounded Retries**: Attempt budget with constant, linear, or exponential delays

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::{retry, RetryPolicy};
