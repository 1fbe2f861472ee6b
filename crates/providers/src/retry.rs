//! Bounded retry with exponential backoff for model calls.
//!
//! Transient failures (rate limits, timeouts, network errors, 5xx) are
//! retried here at the call site; permanent failures (auth, 4xx) are
//! surfaced immediately. Tool dispatch is never retried — malformed or
//! failed tool calls are routed back to the model as results instead.

use async_trait::async_trait;
use helpbot_core::error::ProviderError;
use helpbot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff duration before retry number `attempt` (1-based).
    ///
    /// A rate-limit response carries its own retry-after hint, which wins
    /// over exponential backoff when it is longer.
    fn backoff_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let exponential = self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1));
        if let ProviderError::RateLimited { retry_after_secs } = error {
            exponential.max(Duration::from_secs(*retry_after_secs))
        } else {
            exponential
        }
    }
}

/// A provider wrapper that retries transient failures.
pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0u32;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let backoff = self.policy.backoff_for(attempt, &e);
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        max = self.policy.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient model call failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        info!(provider = %self.inner.name(), attempts = attempt + 1, "Retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}
