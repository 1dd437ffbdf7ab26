//! Content Source Port - CMS documents by relative path

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ContentError;

/// Fetches CMS JSON documents such as `./data/projects.json`.
///
/// Documents are returned as-is; callers treat them as opaque.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentSourcePort: Send + Sync {
    async fn fetch_json(&self, path: &str) -> Result<Value, ContentError>;
}
