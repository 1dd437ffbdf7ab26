//! Media Element Port - the native video element behind the video controller
//!
//! Only the controller talks to this port. Consumers use the controller's
//! facade and never the element directly.

use async_trait::async_trait;

use crate::error::PlaybackError;

/// Native events the element reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// First frame of media data is available
    LoadedData,
    /// A seek has completed
    Seeked,
    /// Playback stopped making progress while data was expected
    Stalled,
    /// The element failed to load or decode its source
    Error(String),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaElementPort: Send + Sync {
    /// Native play. Resolves when playback actually started.
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Native pause. Takes effect synchronously.
    fn pause(&self);

    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    /// Begin a seek. Completion is reported as [`MediaEvent::Seeked`].
    fn set_current_time(&self, secs: f64);

    /// (Re)start loading the source.
    fn load(&self);

    /// Replace the video with its static poster frame.
    fn show_poster(&self);
}
