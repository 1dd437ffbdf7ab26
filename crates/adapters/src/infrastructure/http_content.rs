//! CMS documents fetched over HTTP from a deployed site.

use anyhow::Context;
use async_trait::async_trait;
use folio_ports::outbound::ContentSourcePort;
use folio_ports::ContentError;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: Client,
    base: Url,
}

impl HttpContentSource {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let mut base =
            Url::parse(base).with_context(|| format!("Invalid content URL '{base}'"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Resolve a site-relative path (`./data/x.json`, `/data/x.json`).
    pub fn resolve(&self, path: &str) -> Result<Url, ContentError> {
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        self.base
            .join(relative)
            .map_err(|e| ContentError::io(path, e))
    }
}

#[async_trait]
impl ContentSourcePort for HttpContentSource {
    async fn fetch_json(&self, path: &str) -> Result<Value, ContentError> {
        let url = self.resolve(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ContentError::io(path, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContentError::not_found(path));
        }
        if !status.is_success() {
            return Err(ContentError::Http {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let raw = response.text().await.map_err(|e| ContentError::io(path, e))?;
        let document = serde_json::from_str(&raw).map_err(|e| ContentError::parse(path, e))?;
        tracing::debug!(path, %url, bytes = raw.len(), "Fetched content");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_under_base() {
        let source = HttpContentSource::new("https://studio.example/site").expect("source");
        assert_eq!(
            source.resolve("./data/projects.json").expect("url").as_str(),
            "https://studio.example/site/data/projects.json"
        );
        assert_eq!(
            source.resolve("/data/navigation.json").expect("url").as_str(),
            "https://studio.example/site/data/navigation.json"
        );
        assert!(HttpContentSource::new("site").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        let source = HttpContentSource::new("http://127.0.0.1:9/").expect("source");
        let err = source
            .fetch_json("./data/homepage.json")
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, ContentError::Io { .. }));
        assert!(err.is_transient());
    }
}
