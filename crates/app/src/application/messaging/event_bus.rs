//! In-process publish/subscribe bus.
//!
//! Handlers run synchronously inside [`EventBus::emit`], in registration
//! order. A handler that panics is logged and skipped; the remaining handlers
//! still run. Past events are not replayed to late subscribers.

use std::collections::HashMap;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use folio_domain::{AppEvent, SubscriptionId};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::application::error::EventBusError;

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    handler: EventHandler,
    once: bool,
}

#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Registration>>>,
    debug: AtomicBool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every emit at debug level.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Register a handler for `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.add(event, Arc::new(handler), false)
    }

    /// Register a handler that is removed before its first invocation.
    pub fn once<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.add(event, Arc::new(handler), true)
    }

    fn add(&self, event: &str, handler: EventHandler, once: bool) -> SubscriptionId {
        let id = SubscriptionId::new();
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, handler, once });
        id
    }

    /// Remove one handler. Returns false if it was not registered.
    pub fn off(&self, event: &str, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Invoke every handler currently registered for `event`.
    ///
    /// Returns the number of handlers invoked (including ones that panicked).
    pub fn emit(&self, event: &str, payload: Value) -> usize {
        // Snapshot so handlers may subscribe, unsubscribe or emit re-entrantly.
        let snapshot: Vec<EventHandler> = {
            let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
            match handlers.get_mut(event) {
                Some(list) => {
                    let snapshot = list.iter().map(|r| Arc::clone(&r.handler)).collect();
                    list.retain(|r| !r.once);
                    if list.is_empty() {
                        handlers.remove(event);
                    }
                    snapshot
                }
                None => Vec::new(),
            }
        };

        if self.debug.load(Ordering::Relaxed) {
            tracing::debug!(event, handlers = snapshot.len(), payload = %payload, "Emitting event");
        }

        for handler in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(&payload))).is_err() {
                tracing::error!(event, "Event handler panicked; continuing with remaining handlers");
            }
        }

        snapshot.len()
    }

    /// Emit a well-known event.
    pub fn publish(&self, event: AppEvent) -> usize {
        let payload = event.payload();
        self.emit(event.name(), payload)
    }

    /// Resolve with the payload of the next `event`, or fail after `timeout`.
    ///
    /// The listener is registered when this method is called, so an emit that
    /// happens before the returned future is first polled is not missed.
    pub fn wait_for(
        &self,
        event: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Value, EventBusError>> + '_ {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let id = self.once(event, move |payload| {
            let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(sender) = sender {
                let _ = sender.send(payload.clone());
            }
        });
        let event = event.to_string();

        async move {
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(payload)) => Ok(payload),
                Ok(Err(_)) => Err(EventBusError::Closed { event }),
                Err(_) => {
                    self.off(&event, id);
                    Err(EventBusError::Timeout {
                        event,
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.on("menu:toggle", move |_| log.lock().expect("lock").push(tag));
        }

        assert_eq!(bus.emit("menu:toggle", Value::Null), 3);
        assert_eq!(*log.lock().expect("lock"), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_handler_does_not_break_others() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.on("x", |_| panic!("subscriber bug"));
        let counter = Arc::clone(&calls);
        bus.on("x", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("x", json!(1));
        bus.emit("x", json!(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_off_and_once() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = bus.on("x", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&calls);
        bus.once("x", move |_| {
            counter.fetch_add(10, Ordering::SeqCst);
        });

        bus.emit("x", Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 11);

        assert!(bus.off("x", id));
        assert!(!bus.off("x", id));
        assert_eq!(bus.handler_count("x"), 0);
        assert_eq!(bus.emit("x", Value::Null), 0);
    }

    #[test]
    fn test_publish_uses_event_name() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        bus.on("app:ready", move |payload| {
            *slot.lock().expect("lock") = Some(payload.clone());
        });

        bus.publish(AppEvent::AppReady { page: None });
        assert_eq!(*seen.lock().expect("lock"), Some(json!({ "page": null })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out_without_emit() {
        let bus = EventBus::new();

        let result = bus.wait_for("x", Duration::from_millis(100)).await;

        assert_eq!(
            result,
            Err(EventBusError::Timeout {
                event: "x".into(),
                timeout_ms: 100
            })
        );
        assert_eq!(bus.handler_count("x"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_resolves_with_payload_inside_window() {
        let bus = Arc::new(EventBus::new());

        let emitter = Arc::clone(&bus);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            emitter.emit("x", json!({ "slide": 3 }));
        });

        let payload = bus
            .wait_for("x", Duration::from_millis(100))
            .await
            .expect("emitted within window");
        assert_eq!(payload, json!({ "slide": 3 }));
    }

    #[tokio::test]
    async fn test_wait_for_registers_eagerly() {
        let bus = EventBus::new();
        let pending = bus.wait_for("dom:ready", Duration::from_millis(100));

        // Emitted before the future is polled.
        bus.emit("dom:ready", json!(true));

        assert_eq!(pending.await, Ok(json!(true)));
    }
}
