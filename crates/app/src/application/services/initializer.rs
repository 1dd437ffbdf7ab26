//! Application initializer
//!
//! The single entry point that boots the page:
//!
//! 1. register core modules (constants and error handler are required)
//! 2. wait for the document to finish loading
//! 3. classify the page and register its modules
//! 4. run the module registry
//! 5. final setup: global error hooks, paint timing, query flags, `ready`
//!
//! `initialize` is idempotent. Concurrent callers share one in-flight boot;
//! once it has finished every caller gets the cached outcome, including a
//! failure. A failed boot is not retried.
//!
//! `shutdown` runs the teardown hooks modules registered on the registry's
//! lifecycle manager.

use std::sync::{Arc, Mutex, PoisonError};

use folio_domain::{
    AppEvent, ErrorSource, InitializationStatus, ModuleOptions, PageContext, SiteConstants,
    StateSection,
};
use folio_ports::outbound::{DocumentPort, ErrorListenerPort, PaintObserverPort};
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde_json::{json, Value};

use super::contact_form::ContactFormService;
use super::error_handler::{ErrorHandler, ErrorReport};
use super::preloader::ImagePreloader;
use crate::application::error::InitError;
use crate::application::messaging::EventBus;
use crate::application::modules::{InitReport, ModuleRegistry, PageModuleProvider};
use crate::application::state::AppState;

pub const CONSTANTS_MODULE: &str = "constants";
pub const ERROR_HANDLER_MODULE: &str = "error-handler";
pub const FORM_VALIDATOR_MODULE: &str = "form-validator";
pub const PRELOADER_MODULE: &str = "preloader";

/// Services registered as core modules. Constants and the error handler are
/// required; the others resolve to absent when missing.
#[derive(Default)]
pub struct CoreServices {
    pub constants: Option<SiteConstants>,
    pub error_handler: Option<Arc<ErrorHandler>>,
    pub contact_form: Option<Arc<ContactFormService>>,
    pub preloader: Option<Arc<ImagePreloader>>,
}

/// Host hooks used during boot.
pub struct HostServices {
    pub document: Arc<dyn DocumentPort>,
    pub error_listener: Arc<dyn ErrorListenerPort>,
    pub paint_observer: Arc<dyn PaintObserverPort>,
}

type BootFuture = Shared<BoxFuture<'static, Result<InitReport, InitError>>>;

struct Boot {
    state: Arc<AppState>,
    bus: Arc<EventBus>,
    registry: Arc<ModuleRegistry>,
    core: CoreServices,
    host: HostServices,
    pages: Arc<dyn PageModuleProvider>,
}

pub struct AppInitializer {
    boot: Arc<Boot>,
    in_flight: Mutex<Option<BootFuture>>,
}

impl AppInitializer {
    pub fn new(
        state: Arc<AppState>,
        bus: Arc<EventBus>,
        core: CoreServices,
        host: HostServices,
        pages: Arc<dyn PageModuleProvider>,
    ) -> Self {
        let registry = Arc::new(ModuleRegistry::new(Arc::clone(&state), Arc::clone(&bus)));
        Self {
            boot: Arc::new(Boot {
                state,
                bus,
                registry,
                core,
                host,
                pages,
            }),
            in_flight: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.boot.registry
    }

    pub fn status(&self) -> InitializationStatus {
        self.boot.state.initialization().status
    }

    /// Tear down every module that registered a cleanup. Returns how many ran.
    pub fn shutdown(&self) -> usize {
        let cleaned = self.boot.registry.lifecycle().cleanup_all();
        tracing::info!(cleaned, "Application shut down");
        cleaned
    }

    /// Boot the page, or join the boot already under way.
    pub async fn initialize(&self) -> Result<InitReport, InitError> {
        let boot = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| {
                let boot = Arc::clone(&self.boot);
                async move { boot.run().await }.boxed().shared()
            })
            .clone()
        };
        boot.await
    }
}

impl Boot {
    async fn run(&self) -> Result<InitReport, InitError> {
        let started = tokio::time::Instant::now();
        tracing::info!("Initializing application");

        let result = match self.state.begin_initialization() {
            Ok(()) => self.boot(started).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }

    async fn boot(&self, started: tokio::time::Instant) -> Result<InitReport, InitError> {
        self.register_core_modules()?;

        let document = &self.host.document;
        if !document.is_ready() {
            tracing::debug!("Waiting for document");
            document.wait_until_ready().await;
        }
        self.bus.publish(AppEvent::DomReady);

        let page = PageContext::parse(&document.location())?;
        self.apply_debug(&page);
        self.state
            .set("initialization.page", json!(page.kind))?;
        self.pages.register_page_modules(&page, &self.registry)?;

        let report = self.registry.initialize_all().await?;
        if !report.is_clean() {
            tracing::warn!(failed = ?report.failed, "Some modules failed to initialize");
        }

        self.final_setup(&page, started)?;
        Ok(report)
    }

    fn register_core_modules(&self) -> Result<(), InitError> {
        let constants = self
            .core
            .constants
            .clone()
            .ok_or(InitError::MissingCoreModule(CONSTANTS_MODULE))?;
        let error_handler = self
            .core
            .error_handler
            .clone()
            .ok_or(InitError::MissingCoreModule(ERROR_HANDLER_MODULE))?;

        self.registry
            .register(CONSTANTS_MODULE, ModuleOptions::with_priority(100), move || async move {
                Ok(constants)
            })?;
        self.registry.register(
            ERROR_HANDLER_MODULE,
            ModuleOptions::with_priority(95),
            move || async move { Ok(error_handler) },
        )?;

        let contact_form = self.core.contact_form.clone();
        self.registry.register_optional(
            FORM_VALIDATOR_MODULE,
            ModuleOptions::with_priority(90),
            move || async move { Ok(contact_form) },
        )?;
        let preloader = self.core.preloader.clone();
        self.registry.register_optional(
            PRELOADER_MODULE,
            ModuleOptions::with_priority(85),
            move || async move { Ok(preloader) },
        )?;
        Ok(())
    }

    fn apply_debug(&self, page: &PageContext) {
        if !page.debug {
            return;
        }
        self.state.set_debug(true);
        self.bus.set_debug(true);
        if let Err(e) = self.state.set("ui.debug", Value::Bool(true)) {
            tracing::warn!(error = %e, "Failed to record debug flag");
        }
        tracing::debug!("Debug mode enabled from query string");
    }

    fn final_setup(&self, page: &PageContext, started: tokio::time::Instant) -> Result<(), InitError> {
        if let Some(handler) = &self.core.error_handler {
            let handler = Arc::clone(handler);
            self.host.error_listener.install(Box::new(move |captured| {
                handler.capture_uncaught(captured);
            }));
        }

        let state = Arc::clone(&self.state);
        self.host.paint_observer.observe_lcp(Box::new(move |lcp_ms| {
            if let Err(e) = state.set("performance.lcp_ms", json!(lcp_ms)) {
                tracing::warn!(error = %e, "Failed to record LCP");
            }
        }));

        if page.form_success {
            self.state.set("ui.form_success_visible", Value::Bool(true))?;
        }

        let mut init = self.state.initialization();
        init.status = InitializationStatus::Ready;
        init.completed_at = Some(chrono::Utc::now());
        init.duration_ms = Some(started.elapsed().as_millis() as u64);
        init.error = None;
        self.state.set_section(StateSection::Initialization, &init)?;
        self.state.announce_ready()?;

        tracing::info!(
            page = ?page.kind,
            duration_ms = ?init.duration_ms,
            "Application ready"
        );
        Ok(())
    }

    fn fail(&self, error: &InitError) {
        tracing::error!(error = %error, "Application initialization failed");

        let mut init = self.state.initialization();
        init.status = InitializationStatus::Error;
        init.error = Some(error.to_string());
        if let Err(e) = self.state.set_section(StateSection::Initialization, &init) {
            tracing::warn!(error = %e, "Failed to record initialization error");
        }

        if let Some(handler) = &self.core.error_handler {
            handler.report(ErrorReport::new(ErrorSource::Boot, error.to_string()).critical());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::RegistryError;
    use folio_domain::{ErrorLimits, ModuleStatus};
    use folio_ports::outbound::{
        MockDocumentPort, MockErrorListenerPort, MockNotificationPort, MockPaintObserverPort,
        MockStorageProvider,
    };

    struct NoPageModules;

    impl PageModuleProvider for NoPageModules {
        fn register_page_modules(
            &self,
            _page: &PageContext,
            _registry: &ModuleRegistry,
        ) -> Result<(), RegistryError> {
            Ok(())
        }
    }

    fn error_handler() -> Arc<ErrorHandler> {
        let mut storage = MockStorageProvider::new();
        storage.expect_save().returning(|_, _| ());
        let mut notifications = MockNotificationPort::new();
        notifications.expect_show_toast().returning(|_, _| ());
        Arc::new(ErrorHandler::new(
            ErrorLimits::default(),
            Arc::new(storage),
            Arc::new(notifications),
            None,
        ))
    }

    fn host(location: &'static str) -> HostServices {
        let mut document = MockDocumentPort::new();
        document.expect_is_ready().times(1).returning(|| false);
        document.expect_wait_until_ready().times(1).returning(|| ());
        document
            .expect_location()
            .times(1)
            .returning(move || location.to_string());

        let mut error_listener = MockErrorListenerPort::new();
        error_listener.expect_install().times(1).returning(|_| ());

        let mut paint_observer = MockPaintObserverPort::new();
        paint_observer
            .expect_observe_lcp()
            .times(1)
            .returning(|callback| callback(1234.5));

        HostServices {
            document: Arc::new(document),
            error_listener: Arc::new(error_listener),
            paint_observer: Arc::new(paint_observer),
        }
    }

    fn initializer(core: CoreServices, host: HostServices) -> (AppInitializer, Arc<AppState>) {
        let bus = Arc::new(EventBus::new());
        let state = Arc::new(AppState::new(Some(Arc::clone(&bus))));
        let init = AppInitializer::new(Arc::clone(&state), bus, core, host, Arc::new(NoPageModules));
        (init, state)
    }

    fn required_core() -> CoreServices {
        CoreServices {
            constants: Some(SiteConstants::default()),
            error_handler: Some(error_handler()),
            ..CoreServices::default()
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_boot() {
        let (init, state) = initializer(
            required_core(),
            host("https://studio.example/?form-success=true"),
        );

        let (a, b, c) = tokio::join!(init.initialize(), init.initialize(), init.initialize());
        let report = a.expect("boot");
        assert_eq!(b.expect("boot"), report);
        assert_eq!(c.expect("boot"), report);

        // Already ready: returns the cached report without touching the host.
        assert_eq!(init.initialize().await.expect("cached"), report);

        assert_eq!(init.status(), InitializationStatus::Ready);
        assert!(state.ui().form_success_visible);
        assert_eq!(state.performance().lcp_ms, Some(1234.5));
        assert!(state.initialization().duration_ms.is_some());
    }

    struct WidgetPage {
        torn_down: Arc<std::sync::atomic::AtomicBool>,
    }

    impl PageModuleProvider for WidgetPage {
        fn register_page_modules(
            &self,
            _page: &PageContext,
            registry: &ModuleRegistry,
        ) -> Result<(), RegistryError> {
            let lifecycle = Arc::clone(registry.lifecycle());
            let torn_down = Arc::clone(&self.torn_down);
            registry.register("widget", ModuleOptions::default(), move || async move {
                lifecycle.register("widget", move || {
                    torn_down.store(true, std::sync::atomic::Ordering::SeqCst)
                });
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_shutdown_runs_module_cleanups() {
        let torn_down = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let bus = Arc::new(EventBus::new());
        let state = Arc::new(AppState::new(Some(Arc::clone(&bus))));
        let init = AppInitializer::new(
            state,
            bus,
            required_core(),
            host("https://studio.example/"),
            Arc::new(WidgetPage {
                torn_down: Arc::clone(&torn_down),
            }),
        );

        init.initialize().await.expect("boot");
        assert!(!torn_down.load(std::sync::atomic::Ordering::SeqCst));

        assert_eq!(init.shutdown(), 1);
        assert!(torn_down.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(init.shutdown(), 0);
    }

    #[tokio::test]
    async fn test_optional_core_modules_resolve_absent() {
        let (init, _state) = initializer(required_core(), host("https://studio.example/"));

        let report = init.initialize().await.expect("boot");

        assert_eq!(report.initialized, vec![CONSTANTS_MODULE, ERROR_HANDLER_MODULE]);
        assert_eq!(report.skipped, vec![FORM_VALIDATOR_MODULE, PRELOADER_MODULE]);
        assert_eq!(
            init.registry().status(PRELOADER_MODULE),
            Some(ModuleStatus::Skipped)
        );
        assert!(init
            .registry()
            .get::<SiteConstants>(CONSTANTS_MODULE)
            .is_some());
    }

    #[tokio::test]
    async fn test_missing_required_module_is_fatal_and_cached() {
        let core = CoreServices {
            constants: Some(SiteConstants::default()),
            ..CoreServices::default()
        };
        let host = HostServices {
            document: Arc::new(MockDocumentPort::new()),
            error_listener: Arc::new(MockErrorListenerPort::new()),
            paint_observer: Arc::new(MockPaintObserverPort::new()),
        };
        let (init, state) = initializer(core, host);

        let first = init.initialize().await;
        let second = init.initialize().await;

        assert_eq!(first, Err(InitError::MissingCoreModule(ERROR_HANDLER_MODULE)));
        assert_eq!(second, first);
        assert_eq!(init.status(), InitializationStatus::Error);
        assert_eq!(
            state.initialization().error.as_deref(),
            Some("Required core module 'error-handler' is not available")
        );
    }

    #[tokio::test]
    async fn test_invalid_location_fails_boot() {
        let mut document = MockDocumentPort::new();
        document.expect_is_ready().returning(|| true);
        document
            .expect_location()
            .returning(|| "not a url".to_string());
        let host = HostServices {
            document: Arc::new(document),
            error_listener: Arc::new(MockErrorListenerPort::new()),
            paint_observer: Arc::new(MockPaintObserverPort::new()),
        };
        let handler = error_handler();
        let core = CoreServices {
            constants: Some(SiteConstants::default()),
            error_handler: Some(Arc::clone(&handler)),
            ..CoreServices::default()
        };
        let (init, _state) = initializer(core, host);

        let err = init.initialize().await.expect_err("bad location");
        assert!(matches!(err, InitError::Location(_)));

        let records = handler.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, ErrorSource::Boot);
    }
}
