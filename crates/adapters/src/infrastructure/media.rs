//! Simulated media element
//!
//! Behaves like a browser video element under an autoplay policy: `play()`
//! is refused with `NotAllowedError` until autoplay is allowed or the user has
//! interacted with the page. Native events are delivered on a channel which the
//! host forwards to the video controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use folio_ports::outbound::{MediaElementPort, MediaEvent};
use folio_ports::{PlaybackError, PlaybackErrorKind};
use tokio::sync::mpsc;

pub struct SimulatedMediaElement {
    source: String,
    events: mpsc::UnboundedSender<MediaEvent>,
    autoplay_allowed: bool,
    user_activated: AtomicBool,
    paused: AtomicBool,
    poster_shown: AtomicBool,
    current_time: Mutex<f64>,
    startup_delay: Duration,
}

impl SimulatedMediaElement {
    pub fn new(
        source: impl Into<String>,
        autoplay_allowed: bool,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<MediaEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let element = Arc::new(Self {
            source: source.into(),
            events,
            autoplay_allowed,
            user_activated: AtomicBool::new(false),
            paused: AtomicBool::new(true),
            poster_shown: AtomicBool::new(false),
            current_time: Mutex::new(0.0),
            startup_delay: Duration::from_millis(20),
        });
        (element, rx)
    }

    /// Record a user activation, lifting the autoplay restriction.
    pub fn activate(&self) {
        self.user_activated.store(true, Ordering::SeqCst);
    }

    /// Simulate the network starving playback.
    pub fn stall(&self) {
        self.emit(MediaEvent::Stalled);
    }

    pub fn poster_shown(&self) -> bool {
        self.poster_shown.load(Ordering::SeqCst)
    }

    fn emit(&self, event: MediaEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Media event dropped; no listener");
        }
    }
}

#[async_trait]
impl MediaElementPort for SimulatedMediaElement {
    async fn play(&self) -> Result<(), PlaybackError> {
        tokio::time::sleep(self.startup_delay).await;
        if !self.autoplay_allowed && !self.user_activated.load(Ordering::SeqCst) {
            return Err(PlaybackError::not_allowed(
                "play() failed because the user didn't interact with the document first",
            ));
        }
        if self.source.is_empty() {
            return Err(PlaybackError::new(
                PlaybackErrorKind::NotSupported,
                "no supported source",
            ));
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> f64 {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_current_time(&self, secs: f64) {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = secs;
        self.emit(MediaEvent::Seeked);
    }

    fn load(&self) {
        tracing::debug!(source = %self.source, "Loading video");
        if self.source.is_empty() {
            self.emit(MediaEvent::Error("MEDIA_ERR_SRC_NOT_SUPPORTED".to_string()));
        } else {
            self.emit(MediaEvent::LoadedData);
        }
    }

    fn show_poster(&self) {
        self.poster_shown.store(true, Ordering::SeqCst);
        tracing::info!(source = %self.source, "Showing poster frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_policy_until_activation() {
        let (element, _events) = SimulatedMediaElement::new("media/hero.mp4", false);

        let err = element.play().await.expect_err("blocked");
        assert_eq!(err.kind, PlaybackErrorKind::NotAllowed);
        assert!(element.is_paused());

        element.activate();
        element.play().await.expect("plays after activation");
        assert!(!element.is_paused());
    }

    #[tokio::test]
    async fn test_load_and_seek_emit_events() {
        let (element, mut events) = SimulatedMediaElement::new("media/hero.mp4", true);
        element.load();
        element.set_current_time(0.001);
        element.stall();

        assert_eq!(events.recv().await, Some(MediaEvent::LoadedData));
        assert_eq!(events.recv().await, Some(MediaEvent::Seeked));
        assert_eq!(events.recv().await, Some(MediaEvent::Stalled));
        assert_eq!(element.current_time(), 0.001);
    }

    #[tokio::test]
    async fn test_missing_source_errors_on_load() {
        let (element, mut events) = SimulatedMediaElement::new("", true);
        element.load();
        assert!(matches!(events.recv().await, Some(MediaEvent::Error(_))));
    }
}
