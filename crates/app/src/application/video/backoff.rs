//! Retry delays for failed native play calls.

use std::time::Duration;

/// Exponential backoff: `base * 2^attempt` for `attempt` in `0..max_retries`.
#[derive(Debug, Clone)]
pub struct PlayBackoff {
    attempts: u32,
    max_retries: u32,
    base_delay_ms: u64,
}

impl PlayBackoff {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            attempts: 0,
            max_retries,
            base_delay_ms,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_retries
    }

    /// Delay to wait before the next retry, or `None` once retries are used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let factor = 2u64.saturating_pow(self.attempts);
        self.attempts += 1;
        Some(Duration::from_millis(self.base_delay_ms.saturating_mul(factor)))
    }
}
