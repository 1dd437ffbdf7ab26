//! Well-known events carried by the event bus.
//!
//! The bus itself is keyed by event name with a JSON payload so that page
//! modules can publish their own ad-hoc events. The variants below are the
//! ones the runtime core emits; [`AppEvent::Custom`] covers everything else.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ErrorCategory, ModuleStatus, PageKind, Severity, VideoState};

pub const STATE_CHANGED: &str = "state:changed";
pub const APP_READY: &str = "app:ready";
pub const MODULE_INITIALIZED: &str = "module:initialized";
pub const MODULE_FAILED: &str = "module:failed";
pub const DOM_READY: &str = "dom:ready";
pub const VIDEO_STATE: &str = "video:state";
pub const USER_GESTURE: &str = "user:gesture";
pub const ERROR_REPORTED: &str = "error:reported";
pub const PRELOAD_PROGRESS: &str = "preload:progress";

/// Kind of user interaction that counts as an activation gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Click,
    Touch,
    Keydown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    StateChanged {
        path: String,
        value: Value,
        previous: Option<Value>,
    },
    AppReady {
        page: Option<PageKind>,
    },
    ModuleInitialized {
        name: String,
        status: ModuleStatus,
    },
    ModuleFailed {
        name: String,
        error: String,
    },
    DomReady,
    VideoState {
        from: VideoState,
        to: VideoState,
    },
    UserGesture {
        kind: GestureKind,
    },
    ErrorReported {
        category: ErrorCategory,
        severity: Severity,
        message: String,
    },
    PreloadProgress {
        loaded: usize,
        failed: usize,
        total: usize,
    },
    Custom {
        name: String,
        payload: Value,
    },
}

impl AppEvent {
    /// Bus event name for this event.
    pub fn name(&self) -> &str {
        match self {
            AppEvent::StateChanged { .. } => STATE_CHANGED,
            AppEvent::AppReady { .. } => APP_READY,
            AppEvent::ModuleInitialized { .. } => MODULE_INITIALIZED,
            AppEvent::ModuleFailed { .. } => MODULE_FAILED,
            AppEvent::DomReady => DOM_READY,
            AppEvent::VideoState { .. } => VIDEO_STATE,
            AppEvent::UserGesture { .. } => USER_GESTURE,
            AppEvent::ErrorReported { .. } => ERROR_REPORTED,
            AppEvent::PreloadProgress { .. } => PRELOAD_PROGRESS,
            AppEvent::Custom { name, .. } => name,
        }
    }

    /// Payload delivered to bus handlers.
    pub fn payload(&self) -> Value {
        match self {
            AppEvent::StateChanged {
                path,
                value,
                previous,
            } => json!({ "path": path, "value": value, "previous": previous }),
            AppEvent::AppReady { page } => json!({ "page": page }),
            AppEvent::ModuleInitialized { name, status } => {
                json!({ "name": name, "status": status })
            }
            AppEvent::ModuleFailed { name, error } => json!({ "name": name, "error": error }),
            AppEvent::DomReady => Value::Null,
            AppEvent::VideoState { from, to } => json!({ "from": from, "to": to }),
            AppEvent::UserGesture { kind } => json!({ "kind": kind }),
            AppEvent::ErrorReported {
                category,
                severity,
                message,
            } => json!({ "category": category, "severity": severity, "message": message }),
            AppEvent::PreloadProgress {
                loaded,
                failed,
                total,
            } => json!({ "loaded": loaded, "failed": failed, "total": total }),
            AppEvent::Custom { payload, .. } => payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(AppEvent::DomReady.name(), "dom:ready");
        assert_eq!(
            AppEvent::UserGesture {
                kind: GestureKind::Click
            }
            .name(),
            "user:gesture"
        );
        let custom = AppEvent::Custom {
            name: "showcase:rotate".into(),
            payload: json!(2),
        };
        assert_eq!(custom.name(), "showcase:rotate");
        assert_eq!(custom.payload(), json!(2));
    }

    #[test]
    fn test_video_state_payload() {
        let event = AppEvent::VideoState {
            from: VideoState::Ready,
            to: VideoState::Playing,
        };
        assert_eq!(event.payload(), json!({ "from": "ready", "to": "playing" }));
    }
}
