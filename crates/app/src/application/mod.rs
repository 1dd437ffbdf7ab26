//! Application layer - Orchestration and services

pub mod error;
pub mod messaging;
pub mod modules;
pub mod services;
pub mod state;
pub mod video;

// Re-export common types
pub use error::{
    ContentLoadError, EventBusError, FormError, InitError, RegistryError, StateError, VideoError,
};
pub use messaging::EventBus;
pub use modules::{InitReport, ModuleRegistry, PageModuleProvider, SitePageModules};
pub use services::{AppInitializer, CoreServices, ErrorHandler, HostServices};
pub use state::AppState;
pub use video::VideoController;
