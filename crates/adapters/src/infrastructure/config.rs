//! Site configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_domain::SiteConstants;

/// Runtime configuration loaded from `FOLIO_*` environment variables
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Directory the CMS `./data/*.json` paths and image sources resolve against
    pub site_root: PathBuf,
    /// Deployed site the CMS documents are fetched from instead of `site_root`
    pub content_url: Option<String>,
    /// Location of the page being booted
    pub page_url: String,
    /// Forms endpoint receiving Netlify-encoded posts
    pub form_endpoint: String,
    /// Verbose logging regardless of `?debug=true`
    pub debug: bool,
    /// Whether the simulated browser lets the video autoplay
    pub autoplay_allowed: bool,
    /// Error log file; defaults to the platform config directory
    pub storage_path: Option<PathBuf>,
    /// Hero video source; the home page has no video when unset
    pub hero_video: Option<String>,
    pub constants: SiteConstants,
}

impl SiteConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (environment or a test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SiteConstants::default();
        let mut constants = defaults.clone();

        constants.preload.concurrency = parse_or(
            &lookup,
            "FOLIO_PRELOAD_CONCURRENCY",
            defaults.preload.concurrency,
        )?;
        constants.preload.timeout_ms =
            parse_or(&lookup, "FOLIO_PRELOAD_TIMEOUT_MS", defaults.preload.timeout_ms)?;
        constants.fetch.max_attempts = parse_or(
            &lookup,
            "FOLIO_FETCH_MAX_ATTEMPTS",
            defaults.fetch.max_attempts,
        )?;
        constants.fetch.timeout_ms =
            parse_or(&lookup, "FOLIO_FETCH_TIMEOUT_MS", defaults.fetch.timeout_ms)?;
        constants.video.ready_timeout_ms = parse_or(
            &lookup,
            "FOLIO_VIDEO_READY_TIMEOUT_MS",
            defaults.video.ready_timeout_ms,
        )?;
        constants.video.max_play_retries = parse_or(
            &lookup,
            "FOLIO_VIDEO_MAX_RETRIES",
            defaults.video.max_play_retries,
        )?;

        Ok(Self {
            site_root: lookup("FOLIO_SITE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            content_url: lookup("FOLIO_CONTENT_URL").filter(|s| !s.trim().is_empty()),
            page_url: lookup("FOLIO_PAGE_URL").unwrap_or_else(|| "http://localhost/".to_string()),
            form_endpoint: lookup("FOLIO_FORM_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8888/".to_string()),
            debug: flag(&lookup, "FOLIO_DEBUG"),
            autoplay_allowed: flag(&lookup, "FOLIO_AUTOPLAY"),
            storage_path: lookup("FOLIO_STORAGE_PATH").map(PathBuf::from),
            hero_video: lookup("FOLIO_HERO_VIDEO").filter(|s| !s.trim().is_empty()),
            constants,
        })
    }
}

fn flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
