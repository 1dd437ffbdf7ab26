//! Document Port - page lifecycle and location

use async_trait::async_trait;

/// The host document the runtime is attached to.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentPort: Send + Sync {
    /// Whether the "content loaded" signal has already fired.
    fn is_ready(&self) -> bool;

    /// Resolve once the "content loaded" signal fires.
    ///
    /// Must return immediately when [`DocumentPort::is_ready`] is already true.
    async fn wait_until_ready(&self);

    /// Absolute URL of the current page.
    fn location(&self) -> String;
}
