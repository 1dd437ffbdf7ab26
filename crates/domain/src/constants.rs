//! Site-wide runtime constants.
//!
//! Registered as the `constants` core module so page modules can depend on it
//! instead of hard-coding timings.

use serde::{Deserialize, Serialize};

/// Video playback timings and retry limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoTimings {
    /// How long `start_playback` waits for `ready`/`paused`
    pub ready_timeout_ms: u64,
    /// Retries after the first failed play (non-permission errors)
    pub max_play_retries: u32,
    /// Backoff base: delay = base * 2^attempt
    pub retry_base_delay_ms: u64,
    /// Delay before the single retry after a `stalled` event
    pub stall_retry_delay_ms: u64,
    /// Near-zero seek target used to pin the first visible frame
    pub first_frame_offset_secs: f64,
    /// Upper bound on waiting for `seeked`
    pub seek_timeout_ms: u64,
}

impl Default for VideoTimings {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 5_000,
            max_play_retries: 3,
            retry_base_delay_ms: 100,
            stall_retry_delay_ms: 3_000,
            first_frame_offset_secs: 0.001,
            seek_timeout_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadLimits {
    /// Images fetched concurrently
    pub concurrency: usize,
    /// Per-image timeout
    pub timeout_ms: u64,
}

impl Default for PreloadLimits {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_ms: 10_000,
        }
    }
}

/// Retry policy for CMS document fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRetry {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before retry `n` (0-based) is `base * 2^n`
    pub base_delay_ms: u64,
    /// Per-attempt timeout
    pub timeout_ms: u64,
}

impl Default for FetchRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLimits {
    /// Records retained in memory
    pub max_records: usize,
    /// Records mirrored to persistent storage
    pub persisted_records: usize,
    /// Minimum severity that raises a toast
    pub toast_min_severity: u8,
}

impl Default for ErrorLimits {
    fn default() -> Self {
        Self {
            max_records: 100,
            persisted_records: 10,
            toast_min_severity: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SiteConstants {
    pub video: VideoTimings,
    pub preload: PreloadLimits,
    pub fetch: FetchRetry,
    pub errors: ErrorLimits,
}
