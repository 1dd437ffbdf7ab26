//! Folio domain types.
//!
//! Pure data: no I/O, no async. Everything here is shared by the application
//! services, the adapters and the runner.

pub mod app_event;
pub mod constants;
pub mod error;
pub mod forms;
pub mod ids;
pub mod incident;
pub mod module;
pub mod page;
pub mod state;
pub mod video;

pub use app_event::{AppEvent, GestureKind};
pub use constants::{ErrorLimits, FetchRetry, PreloadLimits, SiteConstants, VideoTimings};
pub use error::DomainError;
pub use forms::{ContactSubmission, CONTACT_FORM_NAME, HONEYPOT_FIELD};
pub use ids::{ErrorId, SubscriptionId};
pub use incident::{ErrorCategory, ErrorRecord, ErrorSource, Severity};
pub use module::{ModuleOptions, ModuleRecord, ModuleStatus};
pub use page::{PageContext, PageKind};
pub use state::{
    DataState, InitializationState, InitializationStatus, PerformanceState, StateSection,
    StateTree, UiState,
};
pub use video::VideoState;
