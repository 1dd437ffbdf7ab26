//! Application state store.
//!
//! The tree is held as JSON so it can be addressed by dotted path
//! (`"data.projects"`, `"modules.hero-video.status"`). The typed sections
//! listed in [`StateSection`] keep their shape: a write that would make one of
//! them fail to deserialize is rejected with [`StateError::TypeMismatch`] and
//! leaves the tree untouched.
//!
//! # Notification order
//!
//! After a successful `set("a.b.c", v)`:
//! 1. subscribers of `a.b.c`
//! 2. subscribers of `a.b`, then `a` (each receives the current value at its path)
//! 3. a `state:changed` event on the bus

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use folio_domain::{
    AppEvent, DataState, InitializationState, InitializationStatus, ModuleRecord, ModuleStatus,
    PerformanceState, StateSection, StateTree, SubscriptionId, UiState,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::application::error::StateError;
use crate::application::messaging::EventBus;

/// Delivered to state subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// Path the subscriber registered for
    pub path: String,
    /// Current value at `path` (None if the path no longer exists)
    pub value: Option<Value>,
    /// Value at `path` before the write
    pub previous: Option<Value>,
    /// Path that was actually written
    pub changed_path: String,
}

pub type StateCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    callback: StateCallback,
}

pub struct AppState {
    tree: RwLock<Value>,
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
    bus: Option<Arc<EventBus>>,
    debug: AtomicBool,
    ready_announced: AtomicBool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppState {
    pub fn new(bus: Option<Arc<EventBus>>) -> Self {
        Self {
            tree: RwLock::new(StateTree::default().to_value()),
            subscribers: RwLock::new(HashMap::new()),
            bus,
            debug: AtomicBool::new(false),
            ready_announced: AtomicBool::new(false),
        }
    }

    /// Log every write (old -> new) at debug level.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        lookup(&tree, &segments).cloned()
    }

    /// Read a path and deserialize it.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Full copy of the tree.
    pub fn snapshot(&self) -> Value {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, path: &str, value: Value) -> Result<(), StateError> {
        let segments = split_path(path)?;
        let watched = self.watched_paths(&segments);

        let (previous, ancestors_before) = {
            let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);

            let ancestors_before: Vec<(String, Option<Value>)> = watched
                .iter()
                .map(|p| (p.clone(), lookup_dotted(&tree, p).cloned()))
                .collect();

            let root = ensure_object(&mut tree);
            let (head, rest) = (segments[0], &segments[1..]);

            let mut section = root.get(head).cloned().unwrap_or(Value::Null);
            let previous = if rest.is_empty() {
                let old = root.get(head).cloned();
                section = value.clone();
                old
            } else {
                write_nested(&mut section, rest, value.clone())
            };

            if let Ok(typed) = head.parse::<StateSection>() {
                typed
                    .validate(&section)
                    .map_err(|e| StateError::TypeMismatch {
                        path: path.to_string(),
                        section: typed.key(),
                        message: e.to_string(),
                    })?;
            }

            root.insert(head.to_string(), section);
            (previous, ancestors_before)
        };

        if self.debug.load(Ordering::Relaxed) {
            tracing::debug!(
                path,
                old = %previous.as_ref().unwrap_or(&serde_json::Value::Null),
                new = %value,
                "State updated"
            );
        }

        self.notify(path, ancestors_before);

        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::StateChanged {
                path: path.to_string(),
                value,
                previous,
            });
        }

        Ok(())
    }

    /// Register `callback` for writes to `path` or any of its descendants.
    pub fn subscribe<F>(&self, path: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .push(Subscriber {
                id,
                callback: Arc::new(callback),
            });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        subscribers.retain(|_, list| {
            let before = list.len();
            list.retain(|s| s.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Record a module's lifecycle status under `modules.<name>`.
    ///
    /// Once every recorded module has settled, `initialization.status` flips to
    /// `ready` and `app:ready` is emitted (once per tree lifetime).
    pub fn update_module_status(
        &self,
        name: &str,
        status: ModuleStatus,
        error: Option<String>,
    ) -> Result<(), StateError> {
        let record = ModuleRecord::new(status, error);
        let value = serde_json::to_value(&record).map_err(|e| StateError::TypeMismatch {
            path: format!("modules.{name}"),
            section: StateSection::Modules.key(),
            message: e.to_string(),
        })?;
        self.set(&format!("modules.{name}"), value)?;

        let modules = self.modules();
        if !modules.is_empty() && modules.values().all(|r| r.status.is_settled()) {
            tracing::debug!(modules = modules.len(), "All modules settled");
            self.announce_ready()?;
        }

        Ok(())
    }

    /// Flip `initialization.status` to `ready` and emit `app:ready`.
    ///
    /// Only the first call per tree lifetime has any effect.
    pub fn announce_ready(&self) -> Result<(), StateError> {
        if self.ready_announced.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.set(
            "initialization.status",
            serde_json::to_value(InitializationStatus::Ready).unwrap_or(Value::Null),
        )?;
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::AppReady {
                page: self.initialization().page,
            });
        }
        Ok(())
    }

    /// Restore one top-level section (or the whole tree) to its default shape.
    ///
    /// Untyped sections have no default and are removed.
    pub fn reset(&self, section: Option<&str>) {
        match section {
            None => {
                let watched: Vec<String> = self
                    .subscribers
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys()
                    .cloned()
                    .collect();
                let before: Vec<(String, Option<Value>)> = {
                    let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
                    let before = watched
                        .into_iter()
                        .map(|p| {
                            let old = lookup_dotted(&tree, &p).cloned();
                            (p, old)
                        })
                        .collect();
                    *tree = StateTree::default().to_value();
                    before
                };
                self.ready_announced.store(false, Ordering::SeqCst);
                tracing::debug!("State tree reset");
                for (path, previous) in before {
                    self.notify_one(&path, previous, "");
                }
                if let Some(bus) = &self.bus {
                    bus.publish(AppEvent::StateChanged {
                        path: String::new(),
                        value: self.snapshot(),
                        previous: None,
                    });
                }
            }
            Some(key) => match key.parse::<StateSection>() {
                Ok(typed) => {
                    if let Err(e) = self.set(typed.key(), typed.default_value()) {
                        tracing::error!(section = key, error = %e, "Failed to reset section");
                    }
                    if typed == StateSection::Modules {
                        self.ready_announced.store(false, Ordering::SeqCst);
                    }
                }
                Err(()) => {
                    let previous = {
                        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
                        ensure_object(&mut tree).remove(key)
                    };
                    if previous.is_some() {
                        self.notify_one(key, previous.clone(), key);
                        if let Some(bus) = &self.bus {
                            bus.publish(AppEvent::StateChanged {
                                path: key.to_string(),
                                value: Value::Null,
                                previous,
                            });
                        }
                    }
                }
            },
        }
    }

    // Typed accessors

    pub fn initialization(&self) -> InitializationState {
        self.section(StateSection::Initialization)
    }

    pub fn ui(&self) -> UiState {
        self.section(StateSection::Ui)
    }

    pub fn data(&self) -> DataState {
        self.section(StateSection::Data)
    }

    pub fn modules(&self) -> std::collections::BTreeMap<String, ModuleRecord> {
        self.section(StateSection::Modules)
    }

    pub fn performance(&self) -> PerformanceState {
        self.section(StateSection::Performance)
    }

    /// Mark boot as started.
    pub fn begin_initialization(&self) -> Result<(), StateError> {
        let mut init = self.initialization();
        init.status = InitializationStatus::Initializing;
        init.started_at = Some(Utc::now());
        init.completed_at = None;
        init.duration_ms = None;
        init.error = None;
        self.set_section(StateSection::Initialization, &init)
    }

    fn section<T: DeserializeOwned + Default>(&self, section: StateSection) -> T {
        self.get(section.key())
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Replace a typed section wholesale.
    pub fn set_section<T: serde::Serialize>(
        &self,
        section: StateSection,
        value: &T,
    ) -> Result<(), StateError> {
        let value = serde_json::to_value(value).map_err(|e| StateError::TypeMismatch {
            path: section.key().to_string(),
            section: section.key(),
            message: e.to_string(),
        })?;
        self.set(section.key(), value)
    }

    /// Paths with subscribers that a write to `segments` must notify, exact
    /// path first, then ancestors nearest to farthest.
    fn watched_paths(&self, segments: &[&str]) -> Vec<String> {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        (1..=segments.len())
            .rev()
            .map(|len| segments[..len].join("."))
            .filter(|p| subscribers.contains_key(p))
            .collect()
    }

    fn notify(&self, changed_path: &str, paths: Vec<(String, Option<Value>)>) {
        for (path, previous) in paths {
            self.notify_one(&path, previous, changed_path);
        }
    }

    fn notify_one(&self, path: &str, previous: Option<Value>, changed_path: &str) {
        let callbacks: Vec<StateCallback> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|list| list.iter().map(|s| Arc::clone(&s.callback)).collect())
            .unwrap_or_default();
        if callbacks.is_empty() {
            return;
        }

        let change = StateChange {
            path: path.to_string(),
            value: self.get(path),
            previous,
            changed_path: changed_path.to_string(),
        };
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&change))).is_err() {
                tracing::error!(path, "State subscriber panicked");
            }
        }
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, StateError> {
    if path.trim().is_empty() {
        return Err(StateError::EmptyPath);
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(StateError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}

fn lookup<'a>(tree: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(*segment))
}

fn lookup_dotted<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    lookup(tree, &segments)
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// Write `value` at `segments` below `node`, creating objects on the way.
/// Returns the value previously stored there.
fn write_nested(node: &mut Value, segments: &[&str], value: Value) -> Option<Value> {
    let mut current = node;
    for segment in &segments[..segments.len() - 1] {
        let map = ensure_object(current);
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let last = segments[segments.len() - 1];
    ensure_object(current).insert(last.to_string(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder(state: &AppState, path: &str, log: &Arc<Mutex<Vec<StateChange>>>) {
        let log = Arc::clone(log);
        state.subscribe(path, move |change| log.lock().expect("lock").push(change.clone()));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let state = AppState::default();
        let cases = [
            ("custom", json!(1)),
            ("custom.nested.deep", json!("value")),
            ("ui.menu_open", json!(true)),
            ("data.projects", json!([{ "slug": "a" }])),
        ];
        for (path, value) in cases {
            state.set(path, value.clone()).expect("set");
            assert_eq!(state.get(path), Some(value), "path {path}");
        }
    }

    #[test]
    fn test_get_missing_segment_is_none() {
        let state = AppState::default();
        assert_eq!(state.get("nope.still.nope"), None);
        assert_eq!(state.get("ui.menu_open.deeper"), None);
    }

    #[test]
    fn test_empty_paths_rejected() {
        let state = AppState::default();
        assert_eq!(state.set("", json!(1)), Err(StateError::EmptyPath));
        assert!(matches!(
            state.set("a..b", json!(1)),
            Err(StateError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_notifies_exact_then_ancestors_in_order() {
        let state = AppState::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&state, "a", &log);
        recorder(&state, "a.b.c", &log);
        recorder(&state, "a.b", &log);
        recorder(&state, "other", &log);
        recorder(&state, "a.b.c.d", &log);

        state.set("a.b.c", json!(7)).expect("set");

        let log = log.lock().expect("lock");
        let order: Vec<&str> = log.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(order, vec!["a.b.c", "a.b", "a"]);
        assert_eq!(log[0].value, Some(json!(7)));
        assert_eq!(log[0].previous, None);
        assert_eq!(log[1].value, Some(json!({ "c": 7 })));
        assert_eq!(log[2].value, Some(json!({ "b": { "c": 7 } })));
        assert!(log.iter().all(|c| c.changed_path == "a.b.c"));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let state = AppState::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let id = state.subscribe("ui", move |c| sink.lock().expect("lock").push(c.clone()));

        state.set("ui.menu_open", json!(true)).expect("set");
        assert!(state.unsubscribe(id));
        state.set("ui.menu_open", json!(false)).expect("set");

        assert_eq!(log.lock().expect("lock").len(), 1);
    }

    #[test]
    fn test_typed_section_rejects_shape_change() {
        let state = AppState::default();

        let err = state
            .set("initialization.status", json!("launching"))
            .expect_err("unknown status");
        assert!(matches!(err, StateError::TypeMismatch { section: "initialization", .. }));
        assert_eq!(state.get("initialization.status"), Some(json!("idle")));

        assert!(state.set("data.projects", json!("not a list")).is_err());
        assert!(state.set("ui.unknown_flag", json!(true)).is_err());
        assert_eq!(state.data().projects, Vec::<Value>::new());
    }

    #[test]
    fn test_reset_data_leaves_initialization() {
        let state = AppState::default();
        state.set("data.projects", json!([{ "slug": "x" }])).expect("set");
        state.set("initialization.status", json!("ready")).expect("set");

        state.reset(Some("data"));

        assert_eq!(state.get("data.projects"), Some(json!([])));
        assert_eq!(state.get("initialization.status"), Some(json!("ready")));
    }

    #[test]
    fn test_reset_untyped_section_removes_it() {
        let state = AppState::default();
        state.set("showcase.index", json!(2)).expect("set");
        state.reset(Some("showcase"));
        assert_eq!(state.get("showcase"), None);
    }

    #[test]
    fn test_full_reset_restores_defaults() {
        let state = AppState::default();
        state.set("ui.debug", json!(true)).expect("set");
        state.set("custom", json!(1)).expect("set");

        state.reset(None);

        assert_eq!(state.snapshot(), StateTree::default().to_value());
    }

    #[test]
    fn test_set_emits_state_changed() {
        let bus = Arc::new(EventBus::new());
        let state = AppState::new(Some(Arc::clone(&bus)));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on("state:changed", move |p| sink.lock().expect("lock").push(p.clone()));

        state.set("ui.menu_open", json!(true)).expect("set");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["path"], json!("ui.menu_open"));
        assert_eq!(seen[0]["value"], json!(true));
        assert_eq!(seen[0]["previous"], json!(false));
    }

    #[test]
    fn test_app_ready_once_all_modules_settle() {
        let bus = Arc::new(EventBus::new());
        let state = AppState::new(Some(Arc::clone(&bus)));
        let ready = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&ready);
        bus.on("app:ready", move |_| *counter.lock().expect("lock") += 1);

        state.update_module_status("constants", ModuleStatus::Pending, None).expect("status");
        state.update_module_status("hero", ModuleStatus::Pending, None).expect("status");
        state.update_module_status("constants", ModuleStatus::Initialized, None).expect("status");
        assert_eq!(*ready.lock().expect("lock"), 0);

        state
            .update_module_status("hero", ModuleStatus::Error, Some("boom".into()))
            .expect("status");
        assert_eq!(*ready.lock().expect("lock"), 1);
        assert_eq!(state.initialization().status, InitializationStatus::Ready);
        assert_eq!(state.modules()["hero"].error.as_deref(), Some("boom"));

        state.update_module_status("hero", ModuleStatus::Error, None).expect("status");
        assert_eq!(*ready.lock().expect("lock"), 1);
    }
}
