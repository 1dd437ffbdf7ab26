//! Folio port definitions.
//!
//! Everything the application layer needs from the host environment (the
//! document, the hero video element, storage, the network) is expressed as a
//! trait here so that services can be driven by mocks in tests and by the
//! desktop adapters in the runner.

pub mod error;
pub mod outbound;

pub use error::{ContentError, ImageLoadError, PlaybackError, PlaybackErrorKind, SubmissionError};
