//! Module registry
//!
//! Stores named async factories with a priority and a dependency list, and
//! runs them in an order that respects both. Each factory is invoked at most
//! once; its outcome is memoized for the rest of the session.
//!
//! # Ordering
//!
//! Kahn's algorithm over the pending modules. Among the modules whose
//! dependencies are all settled, the highest priority goes first; ties keep
//! registration order. Missing dependencies and cycles are reported before
//! any factory runs.
//!
//! # Failure isolation
//!
//! A factory that errors or panics marks only its own module `error`.
//! Dependents of a failed module are marked `error` without running.
//! A factory may resolve to "absent" (`None`), which counts as resolved for
//! its dependents.

use std::any::Any;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use folio_domain::{AppEvent, ModuleOptions, ModuleStatus};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::application::error::RegistryError;
use crate::application::messaging::EventBus;
use crate::application::state::AppState;

use super::lifecycle::LifecycleManager;

/// A resolved module value.
pub type ModuleInstance = Arc<dyn Any + Send + Sync>;

type ModuleFuture = BoxFuture<'static, anyhow::Result<Option<ModuleInstance>>>;
type ModuleFactory = Box<dyn FnOnce() -> ModuleFuture + Send>;

struct Registration {
    name: String,
    options: ModuleOptions,
    /// Registration sequence number, used as the priority tie-breaker
    seq: usize,
    /// Taken when the factory runs
    factory: Option<ModuleFactory>,
}

/// Memoized outcome of a module factory.
#[derive(Clone)]
enum Resolved {
    Ready(ModuleInstance),
    Absent,
    Failed(String),
}

#[derive(Default)]
struct RegistryInner {
    registrations: Vec<Registration>,
    resolved: HashMap<String, Resolved>,
}

/// Outcome of one `initialize_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Modules in the order they were processed
    pub order: Vec<String>,
    pub initialized: Vec<String>,
    pub skipped: Vec<String>,
    /// (module, error message)
    pub failed: Vec<(String, String)>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ModuleRegistry {
    inner: Mutex<RegistryInner>,
    /// Serializes `initialize_all` passes
    run_lock: tokio::sync::Mutex<()>,
    state: Arc<AppState>,
    bus: Arc<EventBus>,
    lifecycle: Arc<LifecycleManager>,
}

impl ModuleRegistry {
    pub fn new(state: Arc<AppState>, bus: Arc<EventBus>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            run_lock: tokio::sync::Mutex::new(()),
            state,
            bus,
            lifecycle: Arc::new(LifecycleManager::new()),
        }
    }

    /// Teardown hooks of the modules this registry initialized.
    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    /// Register a module whose factory always produces a value.
    pub fn register<T, F, Fut>(
        &self,
        name: &str,
        options: ModuleOptions,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.register_optional(name, options, move || factory().map(|r| r.map(Some)))
    }

    /// Register a module whose factory may resolve to "absent".
    pub fn register_optional<T, F, Fut>(
        &self,
        name: &str,
        options: ModuleOptions,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Option<T>>> + Send + 'static,
    {
        validate_name(name)?;

        let boxed: ModuleFactory = Box::new(move || {
            factory()
                .map(|result| result.map(|value| value.map(|v| Arc::new(v) as ModuleInstance)))
                .boxed()
        });

        {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.registrations.iter().any(|r| r.name == name) {
                return Err(RegistryError::DuplicateModule(name.to_string()));
            }
            let seq = inner.registrations.len();
            inner.registrations.push(Registration {
                name: name.to_string(),
                options,
                seq,
                factory: Some(boxed),
            });
        }

        tracing::debug!(module = name, "Module registered");
        if let Err(e) = self
            .state
            .update_module_status(name, ModuleStatus::Pending, None)
        {
            tracing::warn!(module = name, error = %e, "Failed to record module status");
        }
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registrations
            .iter()
            .any(|r| r.name == name)
    }

    /// Registered module names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registrations
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// Memoized value of a module, if it resolved to a value of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.resolved.get(name)? {
            Resolved::Ready(instance) => Arc::clone(instance).downcast::<T>().ok(),
            Resolved::Absent | Resolved::Failed(_) => None,
        }
    }

    /// Clone of a module value, for modules that hold a handle such as an `Arc`.
    pub fn get_cloned<T: Any + Send + Sync + Clone>(&self, name: &str) -> Option<T> {
        self.get::<T>(name).map(|v| (*v).clone())
    }

    pub fn status(&self, name: &str) -> Option<ModuleStatus> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolved) = inner.resolved.get(name) {
            return Some(match resolved {
                Resolved::Ready(_) => ModuleStatus::Initialized,
                Resolved::Absent => ModuleStatus::Skipped,
                Resolved::Failed(_) => ModuleStatus::Error,
            });
        }
        inner
            .registrations
            .iter()
            .find(|r| r.name == name)
            .map(|r| {
                if r.factory.is_some() {
                    ModuleStatus::Pending
                } else {
                    ModuleStatus::Initializing
                }
            })
    }

    /// Initialize every module that has not run yet.
    pub async fn initialize_all(&self) -> Result<InitReport, RegistryError> {
        let _guard = self.run_lock.lock().await;

        let plan = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let order = resolve_order(&inner)?;
            order
                .into_iter()
                .filter_map(|idx| {
                    let registration = &mut inner.registrations[idx];
                    registration.factory.take().map(|factory| {
                        (
                            registration.name.clone(),
                            registration.options.dependencies.clone(),
                            factory,
                        )
                    })
                })
                .collect::<Vec<_>>()
        };

        tracing::info!(
            modules = plan.len(),
            order = ?plan.iter().map(|(name, _, _)| name.as_str()).collect::<Vec<_>>(),
            "Initializing modules"
        );

        let mut report = InitReport::default();
        for (name, dependencies, factory) in plan {
            report.order.push(name.clone());

            if let Some(failed_dep) = self.first_failed_dependency(&dependencies) {
                let message = format!("dependency '{failed_dep}' failed");
                self.settle(&name, Resolved::Failed(message.clone()));
                report.failed.push((name, message));
                continue;
            }

            if let Err(e) = self
                .state
                .update_module_status(&name, ModuleStatus::Initializing, None)
            {
                tracing::warn!(module = %name, error = %e, "Failed to record module status");
            }

            let outcome = run_factory(factory).await;
            match &outcome {
                Resolved::Ready(_) => report.initialized.push(name.clone()),
                Resolved::Absent => report.skipped.push(name.clone()),
                Resolved::Failed(message) => report.failed.push((name.clone(), message.clone())),
            }
            self.settle(&name, outcome);
        }

        tracing::info!(
            initialized = report.initialized.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Module initialization finished"
        );
        Ok(report)
    }

    fn first_failed_dependency(&self, dependencies: &[String]) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        dependencies
            .iter()
            .find(|dep| matches!(inner.resolved.get(dep.as_str()), Some(Resolved::Failed(_))))
            .cloned()
    }

    fn settle(&self, name: &str, outcome: Resolved) {
        let (status, error, event) = match &outcome {
            Resolved::Ready(_) => {
                tracing::info!(module = name, "Module initialized");
                (
                    ModuleStatus::Initialized,
                    None,
                    AppEvent::ModuleInitialized {
                        name: name.to_string(),
                        status: ModuleStatus::Initialized,
                    },
                )
            }
            Resolved::Absent => {
                tracing::info!(module = name, "Module not present on this page");
                (
                    ModuleStatus::Skipped,
                    None,
                    AppEvent::ModuleInitialized {
                        name: name.to_string(),
                        status: ModuleStatus::Skipped,
                    },
                )
            }
            Resolved::Failed(message) => {
                tracing::error!(module = name, error = %message, "Module failed to initialize");
                (
                    ModuleStatus::Error,
                    Some(message.clone()),
                    AppEvent::ModuleFailed {
                        name: name.to_string(),
                        error: message.clone(),
                    },
                )
            }
        };

        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolved
            .insert(name.to_string(), outcome);

        if let Err(e) = self.state.update_module_status(name, status, error) {
            tracing::warn!(module = name, error = %e, "Failed to record module status");
        }
        self.bus.publish(event);
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

/// Invoke a factory, converting errors and panics into a failed outcome.
async fn run_factory(factory: ModuleFactory) -> Resolved {
    let future = match catch_unwind(AssertUnwindSafe(factory)) {
        Ok(future) => future,
        Err(panic) => return Resolved::Failed(panic_message(panic.as_ref())),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(Some(instance))) => Resolved::Ready(instance),
        Ok(Ok(None)) => Resolved::Absent,
        Ok(Err(e)) => Resolved::Failed(format!("{e:#}")),
        Err(panic) => Resolved::Failed(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Ready-queue entry: higher priority first, then lower sequence number.
#[derive(Debug, PartialEq, Eq)]
struct ReadyEntry {
    priority: i32,
    seq: usize,
    idx: usize,
}

impl Ord for ReadyEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// Topological order (indices into `registrations`) of the modules still
/// pending. Dependencies on already-settled modules impose no edge.
fn resolve_order(inner: &RegistryInner) -> Result<Vec<usize>, RegistryError> {
    let registrations = &inner.registrations;
    let index: HashMap<&str, usize> = registrations
        .iter()
        .enumerate()
        .map(|(idx, r)| (r.name.as_str(), idx))
        .collect();

    let pending: Vec<usize> = registrations
        .iter()
        .enumerate()
        .filter(|(_, r)| r.factory.is_some())
        .map(|(idx, _)| idx)
        .collect();

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); registrations.len()];
    let mut in_degree: Vec<usize> = vec![0; registrations.len()];

    for &idx in &pending {
        let registration = &registrations[idx];
        for dep in &registration.options.dependencies {
            let Some(&dep_idx) = index.get(dep.as_str()) else {
                return Err(RegistryError::MissingDependency {
                    module: registration.name.clone(),
                    dependency: dep.clone(),
                });
            };
            if registrations[dep_idx].factory.is_some() {
                dependents[dep_idx].push(idx);
                in_degree[idx] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<ReadyEntry> = pending
        .iter()
        .filter(|&&idx| in_degree[idx] == 0)
        .map(|&idx| ReadyEntry {
            priority: registrations[idx].options.priority,
            seq: registrations[idx].seq,
            idx,
        })
        .collect();

    let mut order = Vec::with_capacity(pending.len());
    while let Some(entry) = ready.pop() {
        order.push(entry.idx);
        for &next in &dependents[entry.idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(ReadyEntry {
                    priority: registrations[next].options.priority,
                    seq: registrations[next].seq,
                    idx: next,
                });
            }
        }
    }

    if order.len() != pending.len() {
        let modules = pending
            .iter()
            .filter(|idx| !order.contains(idx))
            .map(|&idx| registrations[idx].name.clone())
            .collect();
        return Err(RegistryError::CyclicDependency { modules });
    }

    Ok(order)
}
