//! Image availability checks
//!
//! Site-relative sources are checked on disk under the site root. Absolute
//! `http(s)` sources get a HEAD request.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use folio_ports::outbound::ImageLoaderPort;
use folio_ports::ImageLoadError;
use reqwest::Client;
use url::Url;

use super::content_source::resolve_under;

#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
    client: Client,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            client: Client::new(),
        }
    }

    async fn check_remote(&self, src: &str, url: Url) -> Result<(), ImageLoadError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ImageLoadError::Failed {
                src: src.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ImageLoadError::NotFound { src: src.to_string() });
        }
        if !status.is_success() {
            return Err(ImageLoadError::Failed {
                src: src.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }

    async fn check_local(&self, src: &str) -> Result<(), ImageLoadError> {
        let file = resolve_under(&self.root, src);
        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(ImageLoadError::Failed {
                src: src.to_string(),
                message: "not a file".to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ImageLoadError::NotFound { src: src.to_string() })
            }
            Err(e) => Err(ImageLoadError::Failed {
                src: src.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ImageLoaderPort for FsImageLoader {
    async fn load(&self, src: &str) -> Result<(), ImageLoadError> {
        match Url::parse(src) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.check_remote(src, url).await,
            _ => self.check_local(src).await,
        }
    }
}
