//! Headless document
//!
//! Holds the page location and a "content loaded" flag that the host flips
//! with [`HeadlessDocument::mark_ready`].

use async_trait::async_trait;
use folio_ports::outbound::DocumentPort;
use tokio::sync::watch;

pub struct HeadlessDocument {
    location: String,
    ready: watch::Sender<bool>,
}

impl HeadlessDocument {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ready: watch::Sender::new(false),
        }
    }

    /// A document whose content has already loaded.
    pub fn loaded(location: impl Into<String>) -> Self {
        let document = Self::new(location);
        document.mark_ready();
        document
    }

    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }
}

#[async_trait]
impl DocumentPort for HeadlessDocument {
    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    async fn wait_until_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|ready| *ready).await.map(|_| ());
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_waiters_resume_on_ready() {
        let document = Arc::new(HeadlessDocument::new("https://studio.example/"));
        assert!(!document.is_ready());

        let waiter = Arc::clone(&document);
        let task = tokio::spawn(async move { waiter.wait_until_ready().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        document.mark_ready();
        task.await.expect("join");
        assert!(document.is_ready());
    }

    #[tokio::test]
    async fn test_loaded_document_returns_immediately() {
        let document = HeadlessDocument::loaded("https://studio.example/contact.html");
        document.wait_until_ready().await;
        assert_eq!(document.location(), "https://studio.example/contact.html");
    }
}
