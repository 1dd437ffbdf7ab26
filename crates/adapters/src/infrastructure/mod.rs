//! Infrastructure adapters

pub mod config;
pub mod content_source;
pub mod document;
pub mod error_listener;
pub mod forms;
pub mod http_content;
pub mod image_loader;
pub mod media;
pub mod notifications;
pub mod paint;
pub mod resilient_content;
pub mod storage;

pub use config::SiteConfig;
pub use content_source::FsContentSource;
pub use document::HeadlessDocument;
pub use error_listener::PanicHookErrorListener;
pub use forms::NetlifyFormClient;
pub use http_content::HttpContentSource;
pub use image_loader::FsImageLoader;
pub use media::SimulatedMediaElement;
pub use notifications::TracingNotifications;
pub use paint::FixedPaintObserver;
pub use resilient_content::ResilientContentSource;
pub use storage::DesktopStorageProvider;
