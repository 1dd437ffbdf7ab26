//! Uncaught errors from panics.
//!
//! Installs a process panic hook that forwards every panic to the sink before
//! running the previously installed hook.

use std::panic;
use std::sync::{Arc, Once, PoisonError, RwLock};

use folio_ports::outbound::{CapturedError, ErrorListenerPort, ErrorSink};

#[derive(Clone)]
pub struct PanicHookErrorListener {
    sink: Arc<RwLock<Option<ErrorSink>>>,
    hooked: Arc<Once>,
}

impl Default for PanicHookErrorListener {
    fn default() -> Self {
        Self::new()
    }
}

impl PanicHookErrorListener {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(RwLock::new(None)),
            hooked: Arc::new(Once::new()),
        }
    }

    /// Forward a captured error as if it had been raised globally.
    pub fn dispatch(&self, captured: CapturedError) {
        let sink = self.sink.read().unwrap_or_else(PoisonError::into_inner);
        match sink.as_ref() {
            Some(sink) => sink(captured),
            None => tracing::warn!(message = %captured.message, "Uncaught error before listener install"),
        }
    }
}

impl ErrorListenerPort for PanicHookErrorListener {
    fn install(&self, sink: ErrorSink) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);

        self.hooked.call_once(|| {
            let listener = self.clone();
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string());
                let location = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                listener.dispatch(CapturedError {
                    name: Some("panic".to_string()),
                    message,
                    location,
                });
                previous(info);
            }));
            tracing::debug!("Global error listener installed");
        });
    }
}
