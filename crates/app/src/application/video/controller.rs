//! Hero video controller
//!
//! Owns the native media element and is the only code allowed to call it.
//! Playback requests are serialized: a new native play waits for the one in
//! flight, whatever its outcome. A pause issued while a play is in flight
//! wins, because the play result is checked against the pause epoch before
//! the controller moves to `playing`.
//!
//! Media events reach the controller through [`VideoController::handle_event`];
//! the host adapter forwards them from the element.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use folio_domain::app_event::USER_GESTURE;
use folio_domain::{AppEvent, SubscriptionId, VideoState, VideoTimings};
use folio_ports::outbound::{MediaElementPort, MediaEvent};
use folio_ports::{PlaybackError, PlaybackErrorKind};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::backoff::PlayBackoff;
use crate::application::error::VideoError;
use crate::application::messaging::EventBus;

/// Playback counters since the controller was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VideoMetrics {
    pub play_attempts: u64,
    pub play_successes: u64,
    pub errors: u64,
}

#[derive(Default)]
struct Counters {
    play_attempts: AtomicU64,
    play_successes: AtomicU64,
    errors: AtomicU64,
}

enum PlayOutcome {
    Started,
    AlreadyPlaying,
}

pub struct VideoController {
    element: Arc<dyn MediaElementPort>,
    timings: VideoTimings,
    bus: Arc<EventBus>,
    state: watch::Sender<VideoState>,
    /// Bumped on every `seeked` event.
    seeks: watch::Sender<u64>,
    /// Held for the duration of each native play call.
    play_lock: tokio::sync::Mutex<()>,
    /// Bumped by pause and destroy; a play that resolves under a newer epoch
    /// is undone.
    epoch: AtomicU64,
    seek_locked: AtomicBool,
    stall_retry_pending: AtomicBool,
    gesture_listener: Mutex<Option<SubscriptionId>>,
    cancel: Mutex<CancellationToken>,
    counters: Counters,
    this: Weak<VideoController>,
}

impl VideoController {
    pub fn new(
        element: Arc<dyn MediaElementPort>,
        timings: VideoTimings,
        bus: Arc<EventBus>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            element,
            timings,
            bus,
            state: watch::Sender::new(VideoState::Uninitialized),
            seeks: watch::Sender::new(0),
            play_lock: tokio::sync::Mutex::new(()),
            epoch: AtomicU64::new(0),
            seek_locked: AtomicBool::new(false),
            stall_retry_pending: AtomicBool::new(false),
            gesture_listener: Mutex::new(None),
            cancel: Mutex::new(CancellationToken::new()),
            counters: Counters::default(),
            this: this.clone(),
        })
    }

    pub fn state(&self) -> VideoState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<VideoState> {
        self.state.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == VideoState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    pub fn metrics(&self) -> VideoMetrics {
        VideoMetrics {
            play_attempts: self.counters.play_attempts.load(Ordering::Relaxed),
            play_successes: self.counters.play_successes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
        }
    }

    /// Start loading the source. Valid from `uninitialized` or `error`.
    pub fn load(&self) -> Result<(), VideoError> {
        {
            let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
            if cancel.is_cancelled() {
                *cancel = CancellationToken::new();
            }
        }
        self.set_state(VideoState::Loading)?;
        self.element.load();
        Ok(())
    }

    /// Seek the element. Rejected while the first frame is being pinned.
    pub fn seek(&self, secs: f64) -> Result<(), VideoError> {
        if self.seek_locked.load(Ordering::SeqCst) {
            tracing::debug!(secs, "Seek ignored while first frame is pinned");
            return Err(VideoError::SeekLocked);
        }
        self.element.set_current_time(secs);
        Ok(())
    }

    /// Feed a native media event into the state machine.
    pub fn handle_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedData => {
                if self.state() != VideoState::Loading {
                    tracing::debug!(state = %self.state(), "Ignoring loadeddata outside loading");
                    return;
                }
                let Some(this) = self.this.upgrade() else {
                    return;
                };
                let cancel = self.cancel_token();
                tokio::spawn(this.prepare_first_frame(cancel));
            }
            MediaEvent::Seeked => {
                self.seeks.send_modify(|n| *n += 1);
            }
            MediaEvent::Stalled => {
                if self.state() != VideoState::Playing
                    || self.stall_retry_pending.swap(true, Ordering::SeqCst)
                {
                    return;
                }
                let Some(this) = self.this.upgrade() else {
                    return;
                };
                tracing::warn!(
                    delay_ms = self.timings.stall_retry_delay_ms,
                    "Video stalled, scheduling one retry"
                );
                let cancel = self.cancel_token();
                tokio::spawn(this.retry_after_stall(cancel));
            }
            MediaEvent::Error(message) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(error = %message, "Video element error");
                if let Err(e) = self.set_state(VideoState::Error) {
                    tracing::debug!(error = %e, "Element error outside a loading or playing state");
                }
                self.element.show_poster();
            }
        }
    }

    /// Start playback.
    ///
    /// Waits (bounded) for the video to become playable, then plays with
    /// exponential backoff. A permission rejection is not retried here: one
    /// retry is armed for the next user gesture instead.
    pub async fn start_playback(&self) -> Result<(), VideoError> {
        let cancel = self.cancel_token();
        self.wait_until_playable(&cancel).await?;

        let mut backoff =
            PlayBackoff::new(self.timings.max_play_retries, self.timings.retry_base_delay_ms);
        loop {
            if cancel.is_cancelled() {
                return Err(VideoError::Destroyed);
            }
            let epoch = self.epoch.load(Ordering::SeqCst);

            let error = match self.play_native(false).await {
                Ok(PlayOutcome::AlreadyPlaying) => return Ok(()),
                Ok(PlayOutcome::Started) => {
                    self.finish_play(epoch);
                    return Ok(());
                }
                Err(e) => e,
            };
            self.counters.errors.fetch_add(1, Ordering::Relaxed);

            if error.kind == PlaybackErrorKind::NotAllowed {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    tracing::debug!("Autoplay blocked after a pause; not waiting for a gesture");
                    return Ok(());
                }
                tracing::info!("Autoplay blocked; waiting for a user gesture");
                self.arm_gesture_unlock();
                return Err(VideoError::AwaitingGesture);
            }

            let delay = if error.kind.is_transient() {
                backoff.next_delay()
            } else {
                None
            };
            let Some(delay) = delay else {
                tracing::error!(
                    attempts = backoff.attempts() + 1,
                    error = %error,
                    "Video playback failed, showing poster"
                );
                self.element.show_poster();
                return Err(VideoError::Playback(error));
            };

            tracing::warn!(
                attempt = backoff.attempts(),
                max_retries = self.timings.max_play_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Play failed, retrying..."
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(VideoError::Destroyed),
                _ = tokio::time::sleep(delay) => {}
            }
            if self.epoch.load(Ordering::SeqCst) != epoch {
                tracing::debug!("Pause requested during retry backoff; not retrying");
                return Ok(());
            }
        }
    }

    /// Pause immediately. Any play still in flight is undone when it resolves,
    /// and a pending gesture unlock is dropped.
    pub fn pause_playback(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.disarm_gesture_unlock();
        self.element.pause();
        if matches!(self.state(), VideoState::Playing | VideoState::Ready) {
            if let Err(e) = self.set_state(VideoState::Paused) {
                tracing::debug!(error = %e, "Pause transition rejected");
            }
        }
    }

    /// Stop all pending work and return to `uninitialized`.
    pub fn destroy(&self) {
        self.cancel_token().cancel();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.disarm_gesture_unlock();
        self.element.pause();
        self.seek_locked.store(false, Ordering::SeqCst);
        self.stall_retry_pending.store(false, Ordering::SeqCst);
        if let Err(e) = self.set_state(VideoState::Uninitialized) {
            tracing::debug!(error = %e, "Destroy transition rejected");
        }
        tracing::debug!("Video controller destroyed");
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: VideoState) -> Result<(), VideoError> {
        let from = self.state();
        if from == next {
            return Ok(());
        }
        from.transition(next)?;
        self.state.send_replace(next);
        tracing::debug!(%from, to = %next, "Video state");
        self.bus.publish(AppEvent::VideoState { from, to: next });
        Ok(())
    }

    async fn wait_until_playable(&self, cancel: &CancellationToken) -> Result<(), VideoError> {
        let timeout = Duration::from_millis(self.timings.ready_timeout_ms);
        let mut rx = self.state.subscribe();
        let wait = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| s.accepts_play() || *s == VideoState::Playing),
        );
        let ready = tokio::select! {
            _ = cancel.cancelled() => return Err(VideoError::Destroyed),
            r = wait => r.map(|seen| seen.is_ok()),
        };
        match ready {
            Ok(true) => Ok(()),
            Ok(false) => Err(VideoError::Destroyed),
            Err(_) => Err(VideoError::NotReady {
                waited_ms: self.timings.ready_timeout_ms,
                state: self.state(),
            }),
        }
    }

    /// One native play call, serialized against every other.
    async fn play_native(&self, force: bool) -> Result<PlayOutcome, PlaybackError> {
        let _in_flight = self.play_lock.lock().await;
        if !force && self.state() == VideoState::Playing && !self.element.is_paused() {
            return Ok(PlayOutcome::AlreadyPlaying);
        }
        self.counters.play_attempts.fetch_add(1, Ordering::Relaxed);
        self.element.play().await.map(|()| PlayOutcome::Started)
    }

    /// Commit a resolved play unless a pause or destroy happened meanwhile.
    fn finish_play(&self, epoch: u64) {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("Pause requested while play was in flight; staying paused");
            self.element.pause();
            return;
        }
        self.counters.play_successes.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.set_state(VideoState::Playing) {
            tracing::warn!(error = %e, "Play resolved in an unexpected state");
            self.element.pause();
        }
    }

    fn arm_gesture_unlock(&self) {
        let mut slot = self
            .gesture_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }
        let this = self.this.clone();
        let id = self.bus.once(USER_GESTURE, move |_| {
            let Some(controller) = this.upgrade() else {
                return;
            };
            controller
                .gesture_listener
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move { controller.play_after_gesture().await });
                }
                Err(_) => tracing::warn!("User gesture outside the runtime; play not retried"),
            }
        });
        *slot = Some(id);
    }

    fn disarm_gesture_unlock(&self) {
        let id = self
            .gesture_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = id {
            self.bus.off(USER_GESTURE, id);
        }
    }

    async fn play_after_gesture(&self) {
        if !self.state().accepts_play() {
            tracing::debug!(state = %self.state(), "Gesture retry skipped");
            return;
        }
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.play_native(false).await {
            Ok(PlayOutcome::Started) => self.finish_play(epoch),
            Ok(PlayOutcome::AlreadyPlaying) => {}
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "Play after user gesture failed");
            }
        }
    }

    async fn prepare_first_frame(self: Arc<Self>, cancel: CancellationToken) {
        self.seek_locked.store(true, Ordering::SeqCst);
        self.element.pause();

        let mut seeks = self.seeks.subscribe();
        self.element
            .set_current_time(self.timings.first_frame_offset_secs);
        let timeout = Duration::from_millis(self.timings.seek_timeout_ms);
        tokio::select! {
            _ = cancel.cancelled() => {
                self.seek_locked.store(false, Ordering::SeqCst);
                return;
            }
            seeked = tokio::time::timeout(timeout, seeks.changed()) => {
                if seeked.is_err() {
                    tracing::warn!(timeout_ms = self.timings.seek_timeout_ms, "No seeked event; continuing");
                }
            }
        }
        self.seek_locked.store(false, Ordering::SeqCst);

        if self.state() == VideoState::Loading {
            if let Err(e) = self.set_state(VideoState::Ready) {
                tracing::warn!(error = %e, "Could not mark video ready");
            }
        }
    }

    async fn retry_after_stall(self: Arc<Self>, cancel: CancellationToken) {
        let delay = Duration::from_millis(self.timings.stall_retry_delay_ms);
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                if self.state() == VideoState::Playing {
                    match self.play_native(true).await {
                        Ok(_) => tracing::debug!("Resumed after stall"),
                        Err(e) => {
                            self.counters.errors.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(error = %e, "Retry after stall failed");
                        }
                    }
                }
            }
        }
        self.stall_retry_pending.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Element whose play() takes `play_delay` and pops scripted results.
    struct FakeElement {
        play_delay: Duration,
        results: Mutex<VecDeque<Result<(), PlaybackError>>>,
        calls: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
        paused: AtomicBool,
        poster: AtomicBool,
        time: Mutex<f64>,
    }

    impl FakeElement {
        fn new(play_delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                play_delay: Duration::from_millis(play_delay_ms),
                results: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                paused: AtomicBool::new(true),
                poster: AtomicBool::new(false),
                time: Mutex::new(0.0),
            })
        }

        fn script(&self, results: impl IntoIterator<Item = Result<(), PlaybackError>>) {
            self.results.lock().expect("lock").extend(results);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaElementPort for FakeElement {
        async fn play(&self) -> Result<(), PlaybackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.play_delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            let result = self.results.lock().expect("lock").pop_front().unwrap_or(Ok(()));
            if result.is_ok() {
                self.paused.store(false, Ordering::SeqCst);
            }
            result
        }

        fn pause(&self) {
            self.paused.store(true, Ordering::SeqCst);
        }

        fn is_paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }

        fn current_time(&self) -> f64 {
            *self.time.lock().expect("lock")
        }

        fn set_current_time(&self, secs: f64) {
            *self.time.lock().expect("lock") = secs;
        }

        fn load(&self) {}

        fn show_poster(&self) {
            self.poster.store(true, Ordering::SeqCst);
        }
    }

    fn network_error() -> PlaybackError {
        PlaybackError::new(PlaybackErrorKind::Network, "connection reset")
    }

    async fn ready_controller(element: &Arc<FakeElement>) -> (Arc<VideoController>, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new());
        let controller = VideoController::new(
            Arc::clone(element) as Arc<dyn MediaElementPort>,
            VideoTimings::default(),
            Arc::clone(&bus),
        );
        controller.load().expect("load");
        controller.handle_event(MediaEvent::LoadedData);
        while element.current_time() == 0.0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.seek(3.0), Err(VideoError::SeekLocked));
        controller.handle_event(MediaEvent::Seeked);

        let mut rx = controller.subscribe();
        rx.wait_for(|s| *s == VideoState::Ready).await.expect("ready");
        (controller, bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_frame_pinned_before_ready() {
        let element = FakeElement::new(10);
        let (controller, _bus) = ready_controller(&element).await;

        assert_eq!(controller.state(), VideoState::Ready);
        assert_eq!(controller.current_time(), 0.001);
        assert!(controller.seek(2.0).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_plays_never_overlap() {
        let element = FakeElement::new(50);
        let (controller, _bus) = ready_controller(&element).await;

        let (a, b) = tokio::join!(controller.start_playback(), controller.start_playback());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(element.peak.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), VideoState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_during_inflight_play_wins() {
        let element = FakeElement::new(100);
        let (controller, _bus) = ready_controller(&element).await;

        let playing = Arc::clone(&controller);
        let task = tokio::spawn(async move { playing.start_playback().await });
        while element.active.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        controller.pause_playback();

        task.await.expect("join").expect("play resolved");
        assert!(element.is_paused());
        assert_eq!(controller.state(), VideoState::Paused);
        assert_eq!(controller.metrics().play_successes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_allowed_retries_once_on_gesture() {
        let element = FakeElement::new(10);
        element.script([Err(PlaybackError::not_allowed("autoplay blocked"))]);
        let (controller, bus) = ready_controller(&element).await;

        assert_eq!(
            controller.start_playback().await,
            Err(VideoError::AwaitingGesture)
        );
        assert_eq!(element.calls(), 1);
        assert_eq!(bus.handler_count(USER_GESTURE), 1);

        bus.publish(AppEvent::UserGesture {
            kind: folio_domain::GestureKind::Click,
        });
        bus.publish(AppEvent::UserGesture {
            kind: folio_domain::GestureKind::Keydown,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(element.calls(), 2);
        assert_eq!(controller.state(), VideoState::Playing);
        assert_eq!(bus.handler_count(USER_GESTURE), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_during_blocked_play_ignores_later_gesture() {
        let element = FakeElement::new(100);
        element.script([Err(PlaybackError::not_allowed("autoplay blocked"))]);
        let (controller, bus) = ready_controller(&element).await;

        let playing = Arc::clone(&controller);
        let task = tokio::spawn(async move { playing.start_playback().await });
        while element.active.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        controller.pause_playback();
        assert_eq!(task.await.expect("join"), Ok(()));
        assert_eq!(bus.handler_count(USER_GESTURE), 0);

        bus.publish(AppEvent::UserGesture {
            kind: folio_domain::GestureKind::Click,
        });
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(element.calls(), 1);
        assert!(element.is_paused());
        assert_eq!(controller.state(), VideoState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_disarms_pending_gesture_unlock() {
        let element = FakeElement::new(10);
        element.script([Err(PlaybackError::not_allowed("autoplay blocked"))]);
        let (controller, bus) = ready_controller(&element).await;

        assert_eq!(
            controller.start_playback().await,
            Err(VideoError::AwaitingGesture)
        );
        controller.pause_playback();
        assert_eq!(bus.handler_count(USER_GESTURE), 0);

        bus.publish(AppEvent::UserGesture {
            kind: folio_domain::GestureKind::Touch,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(element.calls(), 1);
        assert!(element.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_back_off_then_succeed() {
        let element = FakeElement::new(0);
        element.script([Err(network_error()), Err(network_error()), Err(network_error())]);
        let (controller, _bus) = ready_controller(&element).await;

        let started = tokio::time::Instant::now();
        controller.start_playback().await.expect("fourth attempt plays");

        assert_eq!(element.calls(), 4);
        assert!(started.elapsed() >= Duration::from_millis(700));
        assert_eq!(controller.metrics().errors, 3);
        assert!(!element.poster.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_back_to_poster() {
        let element = FakeElement::new(0);
        element.script(std::iter::repeat_with(|| Err(network_error())).take(5));
        let (controller, _bus) = ready_controller(&element).await;

        let err = controller.start_playback().await.expect_err("gives up");
        assert!(matches!(err, VideoError::Playback(_)));
        assert_eq!(element.calls(), 4);
        assert!(element.poster.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_before_ready_times_out() {
        let element = FakeElement::new(0);
        let controller = VideoController::new(
            Arc::clone(&element) as Arc<dyn MediaElementPort>,
            VideoTimings::default(),
            Arc::new(EventBus::new()),
        );
        controller.load().expect("load");

        let err = controller.start_playback().await.expect_err("not ready");
        assert_eq!(
            err,
            VideoError::NotReady {
                waited_ms: 5_000,
                state: VideoState::Loading
            }
        );
        assert_eq!(element.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_retries_once() {
        let element = FakeElement::new(0);
        let (controller, _bus) = ready_controller(&element).await;
        controller.start_playback().await.expect("play");
        assert_eq!(element.calls(), 1);

        controller.handle_event(MediaEvent::Stalled);
        controller.handle_event(MediaEvent::Stalled);
        tokio::time::sleep(Duration::from_millis(10_000)).await;

        assert_eq!(element.calls(), 2);
        assert_eq!(controller.state(), VideoState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_returns_to_uninitialized() {
        let element = FakeElement::new(0);
        let (controller, bus) = ready_controller(&element).await;
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&transitions);
        bus.on("video:state", move |p| sink.lock().expect("lock").push(p["to"].clone()));

        controller.handle_event(MediaEvent::Error("decode failed".into()));
        controller.destroy();

        assert_eq!(controller.state(), VideoState::Uninitialized);
        assert!(element.poster.load(Ordering::SeqCst));
        assert_eq!(
            *transitions.lock().expect("lock"),
            vec![serde_json::json!("uninitialized")]
        );
        assert!(controller.load().is_ok());
    }
}
