//! Page-specific modules
//!
//! Registered by the initializer after the page has been classified. Core
//! modules (constants, error handler, preloader) are already registered at
//! that point, so page modules may depend on them by name.

use std::sync::Arc;

use folio_domain::{ModuleOptions, PageContext, PageKind};

use crate::application::error::{RegistryError, VideoError};
use crate::application::services::{ContentLoader, ImagePreloader, PreloadSummary};
use crate::application::video::VideoController;

use super::registry::ModuleRegistry;

pub const NAVIGATION_MODULE: &str = "navigation";
pub const PAGE_CONTENT_MODULE: &str = "page-content";
pub const HERO_VIDEO_MODULE: &str = "hero-video";
pub const IMAGE_PRELOAD_MODULE: &str = "image-preload";

/// Registers the modules a given page needs.
pub trait PageModuleProvider: Send + Sync {
    fn register_page_modules(
        &self,
        page: &PageContext,
        registry: &ModuleRegistry,
    ) -> Result<(), RegistryError>;
}

/// The portfolio site's page modules.
pub struct SitePageModules {
    content: Arc<ContentLoader>,
    preloader: Option<Arc<ImagePreloader>>,
    video: Option<Arc<VideoController>>,
}

impl SitePageModules {
    pub fn new(content: Arc<ContentLoader>) -> Self {
        Self {
            content,
            preloader: None,
            video: None,
        }
    }

    pub fn with_preloader(mut self, preloader: Arc<ImagePreloader>) -> Self {
        self.preloader = Some(preloader);
        self
    }

    pub fn with_video(mut self, video: Arc<VideoController>) -> Self {
        self.video = Some(video);
        self
    }
}

impl PageModuleProvider for SitePageModules {
    fn register_page_modules(
        &self,
        page: &PageContext,
        registry: &ModuleRegistry,
    ) -> Result<(), RegistryError> {
        let content = Arc::clone(&self.content);
        registry.register(NAVIGATION_MODULE, ModuleOptions::with_priority(80), move || async move {
            Ok(content.load_navigation().await?)
        })?;

        let content = Arc::clone(&self.content);
        let context = page.clone();
        registry.register(
            PAGE_CONTENT_MODULE,
            ModuleOptions::with_priority(70),
            move || async move {
                content.load_for_page(&context).await?;
                Ok(context.kind)
            },
        )?;

        if page.kind == PageKind::Home {
            let video = self.video.clone();
            let lifecycle = Arc::clone(registry.lifecycle());
            registry.register_optional(
                HERO_VIDEO_MODULE,
                ModuleOptions::with_priority(60),
                move || async move {
                    let Some(video) = video else {
                        return Ok(None);
                    };
                    video.load()?;
                    let teardown = Arc::clone(&video);
                    lifecycle.register(HERO_VIDEO_MODULE, move || teardown.destroy());
                    let autoplay = Arc::clone(&video);
                    tokio::spawn(async move {
                        match autoplay.start_playback().await {
                            Ok(()) => {}
                            Err(VideoError::AwaitingGesture) => {
                                tracing::info!("Hero video will start on first interaction")
                            }
                            Err(e) => tracing::warn!(error = %e, "Hero video autoplay failed"),
                        }
                    });
                    Ok(Some(video))
                },
            )?;
        }

        let content = Arc::clone(&self.content);
        let preloader = self.preloader.clone();
        registry.register_optional(
            IMAGE_PRELOAD_MODULE,
            ModuleOptions::with_priority(50).depends_on([PAGE_CONTENT_MODULE]),
            move || async move {
                let Some(preloader) = preloader else {
                    return Ok(None::<PreloadSummary>);
                };
                Ok(Some(preloader.preload(content.project_images()).await))
            },
        )?;

        tracing::debug!(page = ?page.kind, "Page modules registered");
        Ok(())
    }
}
