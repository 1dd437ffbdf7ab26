//! Module registry and the site's page modules

mod lifecycle;
mod page_modules;
mod registry;

pub use lifecycle::{LifecycleManager, LifecycleStats};
pub use page_modules::{
    PageModuleProvider, SitePageModules, HERO_VIDEO_MODULE, IMAGE_PRELOAD_MODULE,
    NAVIGATION_MODULE, PAGE_CONTENT_MODULE,
};
pub use registry::{InitReport, ModuleInstance, ModuleRegistry};
