//! Hero video playback

mod backoff;
mod controller;

pub use backoff::PlayBackoff;
pub use controller::{VideoController, VideoMetrics};
