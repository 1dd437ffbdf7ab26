//! CMS documents read from the site directory with tokio::fs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_ports::outbound::ContentSourcePort;
use folio_ports::ContentError;
use serde_json::Value;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a site-relative path (`./data/x.json`, `/data/x.json`).
    pub fn resolve(&self, path: &str) -> PathBuf {
        resolve_under(&self.root, path)
    }
}

pub(crate) fn resolve_under(root: &Path, path: &str) -> PathBuf {
    let relative = path.trim_start_matches("./").trim_start_matches('/');
    root.join(relative)
}

#[async_trait]
impl ContentSourcePort for FsContentSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, ContentError> {
        let file = self.resolve(path);
        let raw = fs::read_to_string(&file).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::not_found(path),
            _ => ContentError::io(path, e.to_string()),
        })?;
        let document = serde_json::from_str(&raw).map_err(|e| ContentError::parse(path, e.to_string()))?;
        tracing::debug!(path, file = ?file, bytes = raw.len(), "Fetched content");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetches_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("data")).expect("mkdir");
        std::fs::write(
            dir.path().join("data/navigation.json"),
            r#"{ "items": [{ "label": "Work", "href": "/portfolio.html" }] }"#,
        )
        .expect("write");

        let source = FsContentSource::new(dir.path());
        let nav = source.fetch_json("./data/navigation.json").await.expect("nav");
        assert_eq!(nav["items"][0]["label"], json!("Work"));
    }

    #[tokio::test]
    async fn test_missing_and_malformed_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "{").expect("write");
        let source = FsContentSource::new(dir.path());

        assert_eq!(
            source.fetch_json("./data/homepage.json").await,
            Err(ContentError::not_found("./data/homepage.json"))
        );
        assert!(matches!(
            source.fetch_json("/broken.json").await,
            Err(ContentError::Parse { .. })
        ));
    }
}
