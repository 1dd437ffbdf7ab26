//! Platform abstraction ports
//!
//! Small host services that do not warrant a port module of their own.

use folio_domain::Severity;

/// Persistent key-value storage (localStorage or a file on desktop).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// User-visible toast notifications.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait NotificationPort: Send + Sync {
    fn show_toast(&self, message: &str, severity: Severity);
}

/// Callback receiving the largest-contentful-paint time in milliseconds.
pub type LcpCallback = Box<dyn Fn(f64) + Send + Sync>;

/// Paint timing observer.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PaintObserverPort: Send + Sync {
    /// Report every LCP candidate to `callback`. The last value wins.
    fn observe_lcp(&self, callback: LcpCallback);
}

/// An error captured by a global listener rather than reported by code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    pub name: Option<String>,
    pub message: String,
    /// File/line or task description, when known
    pub location: Option<String>,
}

pub type ErrorSink = Box<dyn Fn(CapturedError) + Send + Sync>;

/// Global uncaught-error hooks.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ErrorListenerPort: Send + Sync {
    /// Route every uncaught error to `sink`. Installing twice replaces the sink.
    fn install(&self, sink: ErrorSink);
}

/// Storage key constants
///
/// Kept in the ports layer as they define the contract for what keys are used
/// across the application.
pub mod storage_keys {
    pub const ERROR_LOG: &str = "folio_error_log";
}
