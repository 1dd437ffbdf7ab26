//! CMS content loader
//!
//! Fetches the site's JSON documents and stores them, unvalidated, under
//! `data.*` in the state tree. Which documents a page needs depends on its
//! [`PageKind`].

use std::sync::Arc;

use folio_domain::{PageContext, PageKind};
use folio_ports::outbound::ContentSourcePort;
use serde_json::Value;

use crate::application::error::ContentLoadError;
use crate::application::state::AppState;

pub const NAVIGATION_PATH: &str = "./data/navigation.json";
pub const HOMEPAGE_PATH: &str = "./data/homepage.json";
pub const PORTFOLIO_PAGE_PATH: &str = "./data/portfolio-page.json";
pub const PROJECTS_PATH: &str = "./data/projects.json";
pub const CONTACT_FORM_PATH: &str = "./data/contact-form.json";

/// Fields of a project document that may hold image sources.
const IMAGE_FIELDS: &[&str] = &["image", "thumbnail", "cover", "heroImage"];

pub struct ContentLoader {
    source: Arc<dyn ContentSourcePort>,
    state: Arc<AppState>,
}

impl ContentLoader {
    pub fn new(source: Arc<dyn ContentSourcePort>, state: Arc<AppState>) -> Self {
        Self { source, state }
    }

    async fn load_into(&self, path: &str, state_path: &str) -> Result<Value, ContentLoadError> {
        let document = self.source.fetch_json(path).await?;
        self.state.set(state_path, document.clone())?;
        tracing::debug!(path, state_path, "Content loaded");
        Ok(document)
    }

    pub async fn load_navigation(&self) -> Result<Value, ContentLoadError> {
        self.load_into(NAVIGATION_PATH, "data.navigation").await
    }

    pub async fn load_homepage(&self) -> Result<Value, ContentLoadError> {
        self.load_into(HOMEPAGE_PATH, "data.homepage").await
    }

    pub async fn load_portfolio_page(&self) -> Result<Value, ContentLoadError> {
        self.load_into(PORTFOLIO_PAGE_PATH, "data.portfolio_page").await
    }

    pub async fn load_contact_form(&self) -> Result<Value, ContentLoadError> {
        self.load_into(CONTACT_FORM_PATH, "data.contact_form").await
    }

    /// Load the project list.
    ///
    /// Accepts either a bare array or an object wrapping it under `projects`.
    pub async fn load_projects(&self) -> Result<Vec<Value>, ContentLoadError> {
        let document = self.source.fetch_json(PROJECTS_PATH).await?;
        let projects = match document {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("projects") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        self.state
            .set("data.projects", Value::Array(projects.clone()))?;
        tracing::debug!(count = projects.len(), "Projects loaded");
        Ok(projects)
    }

    /// Select the project whose `slug` matches and store it as `data.current_project`.
    pub fn select_project(&self, slug: &str) -> Result<Value, ContentLoadError> {
        let project = self
            .state
            .data()
            .projects
            .into_iter()
            .find(|p| p.get("slug").and_then(Value::as_str) == Some(slug))
            .ok_or_else(|| ContentLoadError::ProjectNotFound(slug.to_string()))?;
        self.state.set("data.current_project", project.clone())?;
        Ok(project)
    }

    /// Load every document `page` needs.
    pub async fn load_for_page(&self, page: &PageContext) -> Result<(), ContentLoadError> {
        match page.kind {
            PageKind::Home => {
                self.load_homepage().await?;
                self.load_projects().await?;
            }
            PageKind::Portfolio => {
                self.load_portfolio_page().await?;
                self.load_projects().await?;
            }
            PageKind::ProjectDetail => {
                let slug = page
                    .project_slug
                    .as_deref()
                    .ok_or(ContentLoadError::NoProjectSelected)?;
                self.load_projects().await?;
                self.select_project(slug)?;
            }
            PageKind::Other => {
                self.load_contact_form().await?;
            }
        }
        Ok(())
    }

    /// Image sources referenced by the loaded projects, in document order.
    pub fn project_images(&self) -> Vec<String> {
        self.state
            .data()
            .projects
            .iter()
            .flat_map(|project| {
                IMAGE_FIELDS
                    .iter()
                    .filter_map(move |field| project.get(*field).and_then(Value::as_str))
            })
            .map(str::to_string)
            .collect()
    }
}
