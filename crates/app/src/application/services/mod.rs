//! Application services

mod contact_form;
mod content_loader;
mod error_handler;
mod initializer;
mod preloader;

pub use contact_form::ContactFormService;
pub use content_loader::{
    ContentLoader, CONTACT_FORM_PATH, HOMEPAGE_PATH, NAVIGATION_PATH, PORTFOLIO_PAGE_PATH,
    PROJECTS_PATH,
};
pub use error_handler::{ErrorHandler, ErrorReport};
pub use initializer::{AppInitializer, CoreServices, HostServices};
pub use preloader::{ImagePreloader, PreloadSummary};
