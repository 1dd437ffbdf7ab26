use std::sync::Arc;

use anyhow::Result;
use folio_adapters::infrastructure::{
    DesktopStorageProvider, FixedPaintObserver, FsContentSource, FsImageLoader, HeadlessDocument,
    HttpContentSource, NetlifyFormClient, PanicHookErrorListener, ResilientContentSource,
    SimulatedMediaElement, SiteConfig, TracingNotifications,
};
use folio_app::application::services::{ContactFormService, ContentLoader, ImagePreloader};
use folio_app::application::{
    AppInitializer, AppState, CoreServices, ErrorHandler, EventBus, HostServices, SitePageModules,
    VideoController,
};
use folio_ports::outbound::{ContentSourcePort, MediaEvent, StorageProvider};
use tokio::sync::mpsc;

/// Everything the runner drives after composition.
pub struct Site {
    pub bus: Arc<EventBus>,
    pub state: Arc<AppState>,
    pub document: Arc<HeadlessDocument>,
    pub error_handler: Arc<ErrorHandler>,
    pub initializer: AppInitializer,
    pub video: Option<HeroVideo>,
}

pub struct HeroVideo {
    pub controller: Arc<VideoController>,
    pub element: Arc<SimulatedMediaElement>,
    pub events: mpsc::UnboundedReceiver<MediaEvent>,
}

pub fn build_site(config: &SiteConfig) -> Result<Site> {
    let bus = Arc::new(EventBus::new());
    let state = Arc::new(AppState::new(Some(Arc::clone(&bus))));
    if config.debug {
        bus.set_debug(true);
        state.set_debug(true);
    }

    let storage: Arc<dyn StorageProvider> = match &config.storage_path {
        Some(path) => Arc::new(DesktopStorageProvider::at(path)),
        None => Arc::new(DesktopStorageProvider::new()),
    };
    let error_handler = Arc::new(ErrorHandler::new(
        config.constants.errors.clone(),
        storage,
        Arc::new(TracingNotifications::new()),
        Some(Arc::clone(&bus)),
    ));

    let source: Arc<dyn ContentSourcePort> = match &config.content_url {
        Some(url) => Arc::new(HttpContentSource::new(url)?),
        None => Arc::new(FsContentSource::new(&config.site_root)),
    };
    let content = Arc::new(ContentLoader::new(
        Arc::new(ResilientContentSource::new(source, config.constants.fetch.clone())),
        Arc::clone(&state),
    ));
    let preloader = Arc::new(ImagePreloader::new(
        Arc::new(FsImageLoader::new(&config.site_root)),
        config.constants.preload.clone(),
        Some(Arc::clone(&bus)),
    ));
    let contact_form = Arc::new(ContactFormService::new(
        Arc::new(NetlifyFormClient::new(&config.form_endpoint)?),
        Arc::clone(&state),
    ));

    let mut pages = SitePageModules::new(Arc::clone(&content)).with_preloader(Arc::clone(&preloader));
    let video = config.hero_video.as_ref().map(|source| {
        let (element, events) = SimulatedMediaElement::new(source, config.autoplay_allowed);
        let controller = VideoController::new(
            Arc::clone(&element) as _,
            config.constants.video.clone(),
            Arc::clone(&bus),
        );
        HeroVideo {
            controller,
            element,
            events,
        }
    });
    if let Some(video) = &video {
        pages = pages.with_video(Arc::clone(&video.controller));
    }

    let document = Arc::new(HeadlessDocument::new(config.page_url.clone()));
    let initializer = AppInitializer::new(
        Arc::clone(&state),
        Arc::clone(&bus),
        CoreServices {
            constants: Some(config.constants.clone()),
            error_handler: Some(Arc::clone(&error_handler)),
            contact_form: Some(contact_form),
            preloader: Some(preloader),
        },
        HostServices {
            document: Arc::clone(&document) as _,
            error_listener: Arc::new(PanicHookErrorListener::new()),
            paint_observer: Arc::new(FixedPaintObserver::default()),
        },
        Arc::new(pages),
    );

    Ok(Site {
        bus,
        state,
        document,
        error_handler,
        initializer,
        video,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{InitializationStatus, ModuleStatus};
    use std::collections::HashMap;

    fn write(root: &std::path::Path, rel: &str, body: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, body).expect("write");
    }

    #[tokio::test]
    async fn test_portfolio_page_boots_from_site_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "data/navigation.json", r#"{ "items": [] }"#);
        write(root, "data/portfolio-page.json", r#"{ "title": "Work" }"#);
        write(
            root,
            "data/projects.json",
            r#"{ "projects": [{ "slug": "one", "image": "/img/one.webp" }, { "slug": "two", "image": "/img/gone.webp" }] }"#,
        );
        write(root, "img/one.webp", "RIFF");

        let vars: HashMap<&str, String> = HashMap::from([
            ("FOLIO_SITE_ROOT", root.display().to_string()),
            ("FOLIO_PAGE_URL", "https://studio.example/portfolio.html".to_string()),
            ("FOLIO_STORAGE_PATH", root.join("storage.json").display().to_string()),
        ]);
        let config = SiteConfig::from_lookup(|key| vars.get(key).cloned()).expect("config");

        let site = build_site(&config).expect("site");
        site.document.mark_ready();
        let report = site.initializer.initialize().await.expect("boot");

        assert!(report.is_clean());
        assert_eq!(site.initializer.status(), InitializationStatus::Ready);
        assert_eq!(site.state.data().projects.len(), 2);
        assert_eq!(
            site.state.modules().get("image-preload").map(|r| r.status),
            Some(ModuleStatus::Initialized)
        );
        assert!(site.video.is_none());
    }
}
