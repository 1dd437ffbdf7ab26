//! Component teardown
//!
//! Modules that hold long-lived resources (spawned tasks, bus listeners, the
//! video element) register a cleanup under their name. `cleanup_all` runs
//! when the page goes away, newest registration first, so a component is torn
//! down before whatever it was built on.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

type Cleanup = Box<dyn FnOnce() + Send>;

struct Entry {
    id: String,
    cleanup: Cleanup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleStats {
    pub registered: u64,
    pub cleanups_called: u64,
    /// Ids still awaiting cleanup, in registration order
    pub active: Vec<String>,
}

#[derive(Default)]
struct Counters {
    registered: u64,
    cleanups_called: u64,
}

#[derive(Default)]
pub struct LifecycleManager {
    entries: Mutex<Vec<Entry>>,
    counters: Mutex<Counters>,
    cleaning_up: AtomicBool,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `cleanup` for `id`. An existing registration under the same id
    /// is cleaned up first.
    pub fn register<F>(&self, id: &str, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.has(id) {
            tracing::warn!(component = id, "Component already registered; cleaning up old instance");
            self.cleanup(id);
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                id: id.to_string(),
                cleanup: Box::new(cleanup),
            });
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registered += 1;
        tracing::debug!(component = id, "Cleanup registered");
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.id == id)
    }

    /// Run and forget the cleanup of `id`. Returns false when `id` is unknown
    /// or its cleanup panicked.
    pub fn cleanup(&self, id: &str) -> bool {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            match entries.iter().position(|e| e.id == id) {
                Some(index) => entries.remove(index),
                None => {
                    tracing::debug!(component = id, "No cleanup registered");
                    return false;
                }
            }
        };
        self.run(entry)
    }

    /// Clean up every registered component. Re-entrant calls are ignored.
    /// Returns how many cleanups completed.
    pub fn cleanup_all(&self) -> usize {
        if self.cleaning_up.swap(true, Ordering::SeqCst) {
            tracing::warn!("Cleanup already in progress");
            return 0;
        }
        let entries =
            std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner));
        let total = entries.len();
        let cleaned = entries
            .into_iter()
            .rev()
            .map(|entry| self.run(entry))
            .filter(|ok| *ok)
            .count();
        self.cleaning_up.store(false, Ordering::SeqCst);
        tracing::info!(cleaned, total, "Components cleaned up");
        cleaned
    }

    pub fn stats(&self) -> LifecycleStats {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        LifecycleStats {
            registered: counters.registered,
            cleanups_called: counters.cleanups_called,
            active: self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|e| e.id.clone())
                .collect(),
        }
    }

    fn run(&self, entry: Entry) -> bool {
        let Entry { id, cleanup } = entry;
        if catch_unwind(AssertUnwindSafe(cleanup)).is_err() {
            tracing::error!(component = %id, "Cleanup panicked");
            return false;
        }
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cleanups_called += 1;
        tracing::debug!(component = %id, "Cleaned up");
        true
    }
}
