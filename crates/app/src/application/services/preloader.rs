//! Image preloader
//!
//! Warms the image cache for a batch of sources with bounded concurrency.
//! Sources already loaded in this session and duplicates within a batch are
//! skipped. Each image gets its own timeout so one slow asset cannot hold up
//! the batch.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use folio_domain::{AppEvent, PreloadLimits};
use folio_ports::outbound::ImageLoaderPort;
use futures_util::stream::{self, StreamExt};

use crate::application::messaging::EventBus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadSummary {
    pub loaded: Vec<String>,
    /// (source, reason)
    pub failed: Vec<(String, String)>,
    /// Already cached or duplicated in the batch
    pub skipped: usize,
}

pub struct ImagePreloader {
    loader: Arc<dyn ImageLoaderPort>,
    limits: PreloadLimits,
    bus: Option<Arc<EventBus>>,
    loaded: Mutex<HashSet<String>>,
}

impl ImagePreloader {
    pub fn new(
        loader: Arc<dyn ImageLoaderPort>,
        limits: PreloadLimits,
        bus: Option<Arc<EventBus>>,
    ) -> Self {
        Self {
            loader,
            limits,
            bus,
            loaded: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_loaded(&self, src: &str) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(src)
    }

    pub async fn preload<I, S>(&self, sources: I) -> PreloadSummary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut summary = PreloadSummary::default();
        let mut batch = Vec::new();
        {
            let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
            let mut seen = HashSet::new();
            for src in sources.into_iter().map(Into::into) {
                if src.trim().is_empty() || loaded.contains(&src) || !seen.insert(src.clone()) {
                    summary.skipped += 1;
                } else {
                    batch.push(src);
                }
            }
        }

        let total = batch.len();
        if total == 0 {
            return summary;
        }

        let timeout = Duration::from_millis(self.limits.timeout_ms);
        let concurrency = self.limits.concurrency.max(1);
        tracing::debug!(total, concurrency, "Preloading images");

        let mut results = stream::iter(batch)
            .map(|src| {
                let loader = Arc::clone(&self.loader);
                async move {
                    let outcome = match tokio::time::timeout(timeout, loader.load(&src)).await {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
                    };
                    (src, outcome)
                }
            })
            .buffer_unordered(concurrency);

        while let Some((src, outcome)) = results.next().await {
            match outcome {
                Ok(()) => {
                    self.loaded
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(src.clone());
                    summary.loaded.push(src);
                }
                Err(reason) => {
                    tracing::warn!(src = %src, reason = %reason, "Image preload failed");
                    summary.failed.push((src, reason));
                }
            }

            if let Some(bus) = &self.bus {
                bus.publish(AppEvent::PreloadProgress {
                    loaded: summary.loaded.len(),
                    failed: summary.failed.len(),
                    total,
                });
            }
        }

        tracing::info!(
            loaded = summary.loaded.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped,
            "Image preload finished"
        );
        summary
    }
}
