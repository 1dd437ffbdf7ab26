//! Image Loader Port - warms the image cache for a source URL

use async_trait::async_trait;

use crate::error::ImageLoadError;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageLoaderPort: Send + Sync {
    /// Resolve once the image at `src` is decoded and cached.
    async fn load(&self, src: &str) -> Result<(), ImageLoadError>;
}
