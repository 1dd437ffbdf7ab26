//! Paint timing without a renderer.

use folio_ports::outbound::{LcpCallback, PaintObserverPort};

/// Reports a fixed largest-contentful-paint time, or nothing.
#[derive(Debug, Clone, Default)]
pub struct FixedPaintObserver {
    lcp_ms: Option<f64>,
}

impl FixedPaintObserver {
    pub fn new(lcp_ms: Option<f64>) -> Self {
        Self { lcp_ms }
    }
}

impl PaintObserverPort for FixedPaintObserver {
    fn observe_lcp(&self, callback: LcpCallback) {
        if let Some(ms) = self.lcp_ms {
            callback(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reports_configured_value_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        FixedPaintObserver::new(Some(812.0))
            .observe_lcp(Box::new(move |ms| sink.lock().expect("lock").push(ms)));
        let sink = Arc::clone(&seen);
        FixedPaintObserver::default()
            .observe_lcp(Box::new(move |ms| sink.lock().expect("lock").push(ms)));

        assert_eq!(*seen.lock().expect("lock"), vec![812.0]);
    }
}
