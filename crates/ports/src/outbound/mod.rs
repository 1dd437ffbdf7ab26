//! Outbound ports - Interfaces for the host environment
//!
//! These ports define the contracts that adapters must implement, allowing
//! application services to reach the document, media, storage and network
//! without depending on concrete implementations.

pub mod content_port;
pub mod document_port;
pub mod form_submission_port;
pub mod image_loader_port;
pub mod media_element_port;
pub mod platform;

pub use content_port::ContentSourcePort;
pub use document_port::DocumentPort;
pub use form_submission_port::FormSubmissionPort;
pub use image_loader_port::ImageLoaderPort;
pub use media_element_port::{MediaElementPort, MediaEvent};
pub use platform::{
    storage_keys, CapturedError, ErrorListenerPort, ErrorSink, LcpCallback, NotificationPort,
    PaintObserverPort, StorageProvider,
};

#[cfg(any(test, feature = "testing"))]
pub use content_port::MockContentSourcePort;
#[cfg(any(test, feature = "testing"))]
pub use document_port::MockDocumentPort;
#[cfg(any(test, feature = "testing"))]
pub use form_submission_port::MockFormSubmissionPort;
#[cfg(any(test, feature = "testing"))]
pub use image_loader_port::MockImageLoaderPort;
#[cfg(any(test, feature = "testing"))]
pub use media_element_port::MockMediaElementPort;
#[cfg(any(test, feature = "testing"))]
pub use platform::{
    MockErrorListenerPort, MockNotificationPort, MockPaintObserverPort, MockStorageProvider,
};
