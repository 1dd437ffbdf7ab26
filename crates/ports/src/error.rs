//! Error types for port operations.

use std::fmt;

/// Failure while fetching a CMS document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("Content not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("HTTP {status} fetching {path}")]
    Http { path: String, status: u16 },

    #[error("Timed out after {timeout_ms}ms fetching {path}")]
    Timeout { path: String, timeout_ms: u64 },
}

impl ContentError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Io {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether fetching again can succeed. Client errors (4xx, missing
    /// documents) and malformed JSON are final.
    pub fn is_transient(&self) -> bool {
        match self {
            ContentError::Io { .. } | ContentError::Timeout { .. } => true,
            ContentError::Http { status, .. } => !(400..500).contains(status),
            ContentError::NotFound { .. } | ContentError::Parse { .. } => false,
        }
    }
}

/// Native rejection reasons of a media `play()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackErrorKind {
    /// Autoplay policy refused playback until the user interacts with the page
    NotAllowed,
    /// The play request was interrupted by a pause or a new load
    Abort,
    /// No supported source
    NotSupported,
    /// Source failed to download
    Network,
    Other,
}

impl PlaybackErrorKind {
    /// Whether retrying without user interaction can possibly help.
    pub fn is_transient(self) -> bool {
        !matches!(
            self,
            PlaybackErrorKind::NotAllowed | PlaybackErrorKind::NotSupported
        )
    }
}

impl fmt::Display for PlaybackErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackErrorKind::NotAllowed => write!(f, "NotAllowedError"),
            PlaybackErrorKind::Abort => write!(f, "AbortError"),
            PlaybackErrorKind::NotSupported => write!(f, "NotSupportedError"),
            PlaybackErrorKind::Network => write!(f, "NetworkError"),
            PlaybackErrorKind::Other => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PlaybackError {
    pub kind: PlaybackErrorKind,
    pub message: String,
}

impl PlaybackError {
    pub fn new(kind: PlaybackErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(PlaybackErrorKind::NotAllowed, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Image not found: {src}")]
    NotFound { src: String },

    #[error("Failed to load image {src}: {message}")]
    Failed { src: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Form endpoint rejected submission with status {status}")]
    Rejected { status: u16 },

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_error_display_uses_dom_name() {
        let err = PlaybackError::not_allowed("user gesture required");
        assert_eq!(err.to_string(), "NotAllowedError: user gesture required");
    }

    #[test]
    fn test_client_errors_are_final() {
        let http = |status| ContentError::Http {
            path: "./data/projects.json".into(),
            status,
        };
        assert!(!http(404).is_transient());
        assert!(!http(403).is_transient());
        assert!(http(503).is_transient());
        assert!(ContentError::io("./data/projects.json", "reset").is_transient());
        assert!(!ContentError::not_found("./data/projects.json").is_transient());
        assert!(!ContentError::parse("./data/projects.json", "eof").is_transient());
    }

    #[test]
    fn test_transient_kinds() {
        assert!(!PlaybackErrorKind::NotAllowed.is_transient());
        assert!(!PlaybackErrorKind::NotSupported.is_transient());
        assert!(PlaybackErrorKind::Abort.is_transient());
        assert!(PlaybackErrorKind::Network.is_transient());
    }
}
