//! Content source wrapper with per-attempt timeout and exponential backoff.
//!
//! Wraps any [`ContentSourcePort`]. Transient failures (I/O, timeouts, 5xx)
//! are retried; client errors and malformed documents fail immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_domain::FetchRetry;
use folio_ports::outbound::ContentSourcePort;
use folio_ports::ContentError;
use serde_json::Value;

pub struct ResilientContentSource {
    inner: Arc<dyn ContentSourcePort>,
    config: FetchRetry,
}

impl ResilientContentSource {
    pub fn new(inner: Arc<dyn ContentSourcePort>, config: FetchRetry) -> Self {
        Self { inner, config }
    }

    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt`.
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.config.base_delay_ms.saturating_mul(factor))
    }

    async fn attempt(&self, path: &str) -> Result<Value, ContentError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, self.inner.fetch_json(path)).await {
            Ok(result) => result,
            Err(_) => Err(ContentError::Timeout {
                path: path.to_string(),
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }
}

#[async_trait]
impl ContentSourcePort for ResilientContentSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, ContentError> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let error = match self.attempt(path).await {
                Ok(document) => {
                    if attempt > 0 {
                        tracing::info!(path, attempt = attempt + 1, "Content fetched after retry");
                    }
                    return Ok(document);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::debug!(path, error = %error, "Content fetch failed with non-retryable error");
                return Err(error);
            }
            if attempt + 1 >= attempts {
                tracing::error!(path, attempts, error = %error, "Content fetch failed after all retries");
                return Err(error);
            }

            let delay = self.delay(attempt);
            tracing::warn!(
                path,
                attempt = attempt + 1,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Content fetch failed, retrying..."
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
