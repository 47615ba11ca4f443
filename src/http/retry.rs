//! Bounded retry combinator
//!
//! Wraps a single fallible async operation (one page request) and replays it
//! until it succeeds, fails fatally, or the attempt budget is spent.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget and pacing between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between attempts
    pub delay: Duration,
    /// How the delay grows between attempts
    pub backoff: BackoffType,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(3),
            backoff: BackoffType::Constant,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between a fixed number of attempts
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            ..Self::default()
        }
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, max_delay: Duration) -> Self {
        self.backoff = backoff;
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let delay = match self.backoff {
            BackoffType::Constant => self.delay,
            BackoffType::Linear => self.delay.saturating_mul(attempt),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.delay.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_delay)
    }
}

/// Run `operation` until it succeeds or the policy gives up.
///
/// The closure receives the 1-based attempt number. Delays are only slept
/// between attempts, so an exhausted budget of `n` costs `n - 1` delays.
/// Fatal errors are returned immediately; exhaustion wraps the last error in
/// [`Error::RetriesExhausted`].
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!("Attempt {attempt}/{max_attempts} failed: {e}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
