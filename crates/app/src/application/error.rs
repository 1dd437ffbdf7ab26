//! Service layer error types
//!
//! One enum per service. All of them are `Clone` so that the shared boot
//! future can hand the same failure to every caller.

use folio_domain::{DomainError, VideoState};
use folio_ports::{ContentError, PlaybackError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    #[error("Timed out after {timeout_ms}ms waiting for '{event}'")]
    Timeout { event: String, timeout_ms: u64 },

    #[error("Listener for '{event}' was dropped before the event fired")]
    Closed { event: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("State path cannot be empty")]
    EmptyPath,

    #[error("Invalid state path '{0}': empty segment")]
    EmptySegment(String),

    /// The write would break the shape of a typed section.
    #[error("Type mismatch writing '{path}' into section '{section}': {message}")]
    TypeMismatch {
        path: String,
        section: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Module '{0}' is already registered")]
    DuplicateModule(String),

    #[error("Invalid module name '{0}'")]
    InvalidName(String),

    #[error("Module '{module}' depends on unregistered module '{dependency}'")]
    MissingDependency { module: String, dependency: String },

    #[error("Circular dependency between modules: {}", .modules.join(", "))]
    CyclicDependency { modules: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("Required core module '{0}' is not available")]
    MissingCoreModule(&'static str),

    #[error("Invalid page location: {0}")]
    Location(#[from] DomainError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Initializer was dropped before boot completed")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    #[error("Video not playable after {waited_ms}ms (state: {state})")]
    NotReady { waited_ms: u64, state: VideoState },

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Playback is waiting for a user gesture")]
    AwaitingGesture,

    #[error("Video controller was destroyed")]
    Destroyed,

    #[error("Seeking is locked while the first frame is being prepared")]
    SeekLocked,

    #[error(transparent)]
    Transition(#[from] DomainError),
}

/// Failure while loading page content into the state tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentLoadError {
    #[error(transparent)]
    Source(#[from] ContentError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("No project selected (missing ?p=<slug>)")]
    NoProjectSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Invalid submission: {0}")]
    Invalid(String),

    #[error(transparent)]
    Submission(#[from] folio_ports::SubmissionError),
}
