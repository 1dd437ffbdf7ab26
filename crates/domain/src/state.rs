//! Typed shape of the application state tree.
//!
//! The state store keeps the tree as JSON so that dotted-path access keeps
//! working, but the well-known sections below have a fixed shape. A write that
//! would make one of these sections fail to deserialize is rejected by the store.
//! Top-level keys outside this list are free-form.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ModuleRecord, PageKind};

/// Boot lifecycle of the whole page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InitializationStatus {
    #[default]
    Idle,
    Initializing,
    Ready,
    Error,
}

impl fmt::Display for InitializationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitializationStatus::Idle => write!(f, "idle"),
            InitializationStatus::Initializing => write!(f, "initializing"),
            InitializationStatus::Ready => write!(f, "ready"),
            InitializationStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct InitializationState {
    pub status: InitializationStatus,
    pub page: Option<PageKind>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct UiState {
    pub debug: bool,
    pub menu_open: bool,
    pub scroll_locked: bool,
    pub form_success_visible: bool,
    pub toast: Option<String>,
}

/// CMS documents, stored as fetched (no schema validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DataState {
    pub navigation: Option<Value>,
    pub homepage: Option<Value>,
    pub portfolio_page: Option<Value>,
    pub projects: Vec<Value>,
    pub contact_form: Option<Value>,
    pub current_project: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceState {
    /// Largest contentful paint, milliseconds since navigation start
    pub lcp_ms: Option<f64>,
}

/// Default shape of the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StateTree {
    pub initialization: InitializationState,
    pub ui: UiState,
    pub data: DataState,
    pub modules: BTreeMap<String, ModuleRecord>,
    pub performance: PerformanceState,
}

/// The typed top-level sections of [`StateTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateSection {
    Initialization,
    Ui,
    Data,
    Modules,
    Performance,
}

impl StateSection {
    pub const ALL: [StateSection; 5] = [
        StateSection::Initialization,
        StateSection::Ui,
        StateSection::Data,
        StateSection::Modules,
        StateSection::Performance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StateSection::Initialization => "initialization",
            StateSection::Ui => "ui",
            StateSection::Data => "data",
            StateSection::Modules => "modules",
            StateSection::Performance => "performance",
        }
    }

    /// Default JSON shape for this section.
    pub fn default_value(self) -> Value {
        let tree = StateTree::default();
        let value = match self {
            StateSection::Initialization => serde_json::to_value(tree.initialization),
            StateSection::Ui => serde_json::to_value(tree.ui),
            StateSection::Data => serde_json::to_value(tree.data),
            StateSection::Modules => serde_json::to_value(tree.modules),
            StateSection::Performance => serde_json::to_value(tree.performance),
        };
        value.unwrap_or(Value::Null)
    }

    /// Check that `value` still has this section's shape.
    pub fn validate(self, value: &Value) -> Result<(), serde_json::Error> {
        match self {
            StateSection::Initialization => {
                InitializationState::deserialize(value).map(|_| ())
            }
            StateSection::Ui => UiState::deserialize(value).map(|_| ()),
            StateSection::Data => DataState::deserialize(value).map(|_| ()),
            StateSection::Modules => {
                BTreeMap::<String, ModuleRecord>::deserialize(value).map(|_| ())
            }
            StateSection::Performance => PerformanceState::deserialize(value).map(|_| ()),
        }
    }
}

impl FromStr for StateSection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateSection::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or(())
    }
}

impl StateTree {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_tree_shape() {
        let value = StateTree::default().to_value();
        assert_eq!(value["initialization"]["status"], json!("idle"));
        assert_eq!(value["data"]["projects"], json!([]));
        assert_eq!(value["modules"], json!({}));
    }

    #[test]
    fn test_section_validation_rejects_bad_enum() {
        let bad = json!({ "status": "launching" });
        assert!(StateSection::Initialization.validate(&bad).is_err());
        let good = json!({ "status": "ready" });
        assert!(StateSection::Initialization.validate(&good).is_ok());
    }

    #[test]
    fn test_section_validation_rejects_unknown_field() {
        let bad = json!({ "projects": [], "unexpected": 1 });
        assert!(StateSection::Data.validate(&bad).is_err());
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("data".parse::<StateSection>(), Ok(StateSection::Data));
        assert!("custom".parse::<StateSection>().is_err());
    }
}
