//! Error taxonomy for captured runtime errors.
//!
//! Classification is a keyword heuristic over the error name and message,
//! checked in this order: permission, network, media, runtime. Anything that
//! matches none of them is `Unknown`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ErrorId;

/// Broad class of a captured error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Media,
    Permission,
    Runtime,
    Unknown,
}

const PERMISSION_KEYWORDS: &[&str] = &["notallowed", "not allowed", "permission", "denied", "autoplay"];
const NETWORK_KEYWORDS: &[&str] = &[
    "network",
    "fetch",
    "timeout",
    "timed out",
    "connection",
    "failed to load resource",
];
const MEDIA_KEYWORDS: &[&str] = &["video", "image", "media", "decode", "poster", "src"];
const RUNTIME_KEYWORDS: &[&str] = &[
    "syntax",
    "unexpected token",
    "referenceerror",
    "typeerror",
    "undefined",
    "panic",
];

impl ErrorCategory {
    /// Classify an error by keyword heuristics on its name and message.
    pub fn classify(name: Option<&str>, message: &str) -> Self {
        let haystack = format!("{} {}", name.unwrap_or_default(), message).to_ascii_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| haystack.contains(k));

        if hit(PERMISSION_KEYWORDS) {
            ErrorCategory::Permission
        } else if hit(NETWORK_KEYWORDS) {
            ErrorCategory::Network
        } else if hit(MEDIA_KEYWORDS) {
            ErrorCategory::Media
        } else if hit(RUNTIME_KEYWORDS) {
            ErrorCategory::Runtime
        } else {
            ErrorCategory::Unknown
        }
    }

    /// Default severity when the reporter does not supply one.
    pub fn default_severity(self) -> Severity {
        match self {
            ErrorCategory::Unknown => Severity::new(1),
            ErrorCategory::Media => Severity::new(2),
            ErrorCategory::Network => Severity::new(3),
            ErrorCategory::Permission => Severity::new(3),
            ErrorCategory::Runtime => Severity::new(4),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Media => write!(f, "media"),
            ErrorCategory::Permission => write!(f, "permission"),
            ErrorCategory::Runtime => write!(f, "runtime"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Severity score, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MIN: Severity = Severity(1);
    pub const MAX: Severity = Severity(5);

    /// Clamp into the valid range.
    pub fn new(score: u8) -> Self {
        Self(score.clamp(1, 5))
    }

    pub fn score(self) -> u8 {
        self.0
    }
}

/// Where an error was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    /// Global listener (uncaught error / unhandled rejection)
    Global,
    /// A page module factory
    Module(String),
    /// The boot sequence itself
    Boot,
    /// Video playback layer
    Video,
    /// Explicitly reported by application code
    Manual,
}

/// Normalized error record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: ErrorId,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub name: Option<String>,
    pub message: String,
    pub source: ErrorSource,
    pub context: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    /// Whether this record should surface a user-visible toast.
    pub fn is_user_visible(&self, min_severity: Severity) -> bool {
        self.severity >= min_severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_beats_media() {
        let category = ErrorCategory::classify(
            Some("NotAllowedError"),
            "play() failed because the user didn't interact with the video first",
        );
        assert_eq!(category, ErrorCategory::Permission);
    }

    #[test]
    fn test_classify_network() {
        assert_eq!(
            ErrorCategory::classify(None, "Failed to fetch ./data/projects.json"),
            ErrorCategory::Network
        );
    }

    #[test]
    fn test_classify_media() {
        assert_eq!(
            ErrorCategory::classify(Some("MediaError"), "could not decode"),
            ErrorCategory::Media
        );
    }

    #[test]
    fn test_classify_runtime_and_unknown() {
        assert_eq!(
            ErrorCategory::classify(Some("SyntaxError"), "Unexpected token <"),
            ErrorCategory::Runtime
        );
        assert_eq!(
            ErrorCategory::classify(None, "something odd"),
            ErrorCategory::Unknown
        );
    }

    #[test]
    fn test_severity_clamps() {
        assert_eq!(Severity::new(0), Severity::MIN);
        assert_eq!(Severity::new(9), Severity::MAX);
        assert_eq!(Severity::new(3).score(), 3);
    }

    #[test]
    fn test_default_severity_toast_threshold() {
        let threshold = Severity::new(3);
        assert!(ErrorCategory::Runtime.default_severity() >= threshold);
        assert!(ErrorCategory::Network.default_severity() >= threshold);
        assert!(ErrorCategory::Media.default_severity() < threshold);
        assert!(ErrorCategory::Unknown.default_severity() < threshold);
    }
}
