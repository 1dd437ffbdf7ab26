//! Page classification and query parameters for the current location.
//!
//! The site serves three page families:
//! - `/`, `/index.html` and any directory path - Home
//! - paths containing `portfolio` - Portfolio listing
//! - paths containing `project-detail`, under `/progetti/` or starting with
//!   `/project` - Project detail
//!
//! A project is selected with `?p=<slug>` or `?slug=<slug>`, then the hash
//! fragment, then the file name under `/progetti/`.
//!
//! Anything else is `Other` and gets no page-specific modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::DomainError;

/// Directory holding one page per project.
const PROJECTS_DIR: &str = "progetti";

/// Generic detail templates that take the slug from the query.
const DETAIL_TEMPLATES: &[&str] = &["project.html", "project-detail.html"];

/// Page family derived from the location path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    Portfolio,
    ProjectDetail,
    Other,
}

impl PageKind {
    /// Classify a location path. Project detail wins over the directory
    /// rule so `/progetti/` is never taken for the home page.
    pub fn classify(path: &str) -> Self {
        let path = path.trim().to_ascii_lowercase();

        if path.contains("project-detail")
            || path.contains(&format!("/{PROJECTS_DIR}/"))
            || path.starts_with("/project")
        {
            return PageKind::ProjectDetail;
        }
        if path.is_empty() || path.ends_with('/') {
            return PageKind::Home;
        }
        match path.as_str() {
            "/index.html" | "/index" | "/home" => PageKind::Home,
            p if p.contains("portfolio") => PageKind::Portfolio,
            _ => PageKind::Other,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Home => write!(f, "home"),
            PageKind::Portfolio => write!(f, "portfolio"),
            PageKind::ProjectDetail => write!(f, "project_detail"),
            PageKind::Other => write!(f, "other"),
        }
    }
}

/// Everything the runtime needs to know about the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub kind: PageKind,
    /// `?debug=true`
    pub debug: bool,
    /// `?p=<slug>` or `?slug=<slug>`, falling back to the fragment and the
    /// page name under `/progetti/`
    pub project_slug: Option<String>,
    /// `?form-success=true`
    pub form_success: bool,
}

impl PageContext {
    /// Parse an absolute page URL.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let url = Url::parse(raw).map_err(|e| DomainError::parse(format!("{raw}: {e}")))?;

        let mut debug = false;
        let mut slug_param = None;
        let mut p_param = None;
        let mut form_success = false;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "debug" => debug = is_truthy(&value),
                "slug" => slug_param = non_empty(&value),
                "p" => p_param = non_empty(&value),
                "form-success" => form_success = is_truthy(&value),
                _ => {}
            }
        }

        let project_slug = slug_param
            .or(p_param)
            .or_else(|| url.fragment().and_then(non_empty))
            .or_else(|| slug_from_path(url.path()));

        Ok(Self {
            kind: PageKind::classify(url.path()),
            url: url.to_string(),
            debug,
            project_slug,
            form_success,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// `/progetti/cafe-124.html` -> `cafe-124`
fn slug_from_path(path: &str) -> Option<String> {
    let mut segments = path.split('/');
    segments.find(|s| *s == PROJECTS_DIR)?;
    let page = segments.next()?;
    if DETAIL_TEMPLATES.contains(&page) {
        return None;
    }
    non_empty(page.trim_end_matches(".html"))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
