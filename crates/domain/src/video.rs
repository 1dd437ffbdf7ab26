//! Video session states and the transitions the controller may take between them.
//!
//! ```text
//! uninitialized -> loading -> ready <-> playing <-> paused
//!                     |                    |
//!                     +------> error <-----+
//! ```
//!
//! Every state may return to `uninitialized` through an explicit destroy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Video session state owned by the video controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

impl VideoState {
    /// Whether the controller may move from `self` to `next`.
    pub fn can_transition_to(self, next: VideoState) -> bool {
        use VideoState::*;

        if next == Uninitialized {
            return true;
        }

        matches!(
            (self, next),
            (Uninitialized, Loading)
                | (Error, Loading)
                | (Loading, Ready)
                | (Loading, Error)
                | (Ready, Playing)
                | (Ready, Paused)
                | (Playing, Paused)
                | (Playing, Error)
                | (Paused, Playing)
        )
    }

    /// Validate a transition, returning the target state on success.
    pub fn transition(self, next: VideoState) -> Result<VideoState, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_transition(self, next))
        }
    }

    /// States from which a native play call may be issued.
    pub fn accepts_play(self) -> bool {
        matches!(self, VideoState::Ready | VideoState::Paused)
    }
}

impl fmt::Display for VideoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoState::Uninitialized => write!(f, "uninitialized"),
            VideoState::Loading => write!(f, "loading"),
            VideoState::Ready => write!(f, "ready"),
            VideoState::Playing => write!(f, "playing"),
            VideoState::Paused => write!(f, "paused"),
            VideoState::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let state = VideoState::Uninitialized;
        let state = state.transition(VideoState::Loading).expect("load");
        let state = state.transition(VideoState::Ready).expect("ready");
        let state = state.transition(VideoState::Playing).expect("play");
        let state = state.transition(VideoState::Paused).expect("pause");
        let state = state.transition(VideoState::Playing).expect("resume");
        assert_eq!(state, VideoState::Playing);
    }

    #[test]
    fn test_error_only_from_loading_or_playing() {
        assert!(VideoState::Loading.can_transition_to(VideoState::Error));
        assert!(VideoState::Playing.can_transition_to(VideoState::Error));
        assert!(!VideoState::Paused.can_transition_to(VideoState::Error));
        assert!(!VideoState::Ready.can_transition_to(VideoState::Error));
    }

    #[test]
    fn test_destroy_allowed_from_everywhere() {
        for state in [
            VideoState::Uninitialized,
            VideoState::Loading,
            VideoState::Ready,
            VideoState::Playing,
            VideoState::Paused,
            VideoState::Error,
        ] {
            assert!(state.can_transition_to(VideoState::Uninitialized));
        }
    }

    #[test]
    fn test_rejects_skipping_ready() {
        let err = VideoState::Loading
            .transition(VideoState::Playing)
            .expect_err("loading cannot jump to playing");
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }
}
