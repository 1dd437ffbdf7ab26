//! Module lifecycle vocabulary shared by the registry and the state store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one registered page module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// Registered, factory not yet invoked
    #[default]
    Pending,
    /// Factory currently running
    Initializing,
    /// Factory resolved with a value
    Initialized,
    /// Factory resolved to "absent" (optional module not present on this page)
    Skipped,
    /// Factory failed, panicked, or a dependency failed
    Error,
}

impl ModuleStatus {
    /// A settled module will never change status again during this session.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ModuleStatus::Initialized | ModuleStatus::Skipped | ModuleStatus::Error
        )
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStatus::Pending => write!(f, "pending"),
            ModuleStatus::Initializing => write!(f, "initializing"),
            ModuleStatus::Initialized => write!(f, "initialized"),
            ModuleStatus::Skipped => write!(f, "skipped"),
            ModuleStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for ModuleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ModuleStatus::Pending),
            "initializing" => Ok(ModuleStatus::Initializing),
            "initialized" | "ready" => Ok(ModuleStatus::Initialized),
            "skipped" | "absent" => Ok(ModuleStatus::Skipped),
            "error" | "failed" => Ok(ModuleStatus::Error),
            _ => Err(()),
        }
    }
}

/// Per-module bookkeeping kept under `modules.<name>` in the state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ModuleRecord {
    pub status: ModuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModuleRecord {
    pub fn new(status: ModuleStatus, error: Option<String>) -> Self {
        Self {
            status,
            error,
            updated_at: Some(Utc::now()),
        }
    }
}

/// Ordering and dependency hints supplied at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Higher values initialize earlier among modules whose dependencies are met
    pub priority: i32,
    /// Names of modules that must resolve before this one starts
    pub dependencies: Vec<String>,
}

impl ModuleOptions {
    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            dependencies: Vec::new(),
        }
    }

    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_statuses() {
        assert!(!ModuleStatus::Pending.is_settled());
        assert!(!ModuleStatus::Initializing.is_settled());
        assert!(ModuleStatus::Initialized.is_settled());
        assert!(ModuleStatus::Skipped.is_settled());
        assert!(ModuleStatus::Error.is_settled());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(ModuleStatus::Initialized).expect("serialize");
        assert_eq!(json, serde_json::json!("initialized"));
    }

    #[test]
    fn test_status_from_str_aliases() {
        assert_eq!("ready".parse::<ModuleStatus>(), Ok(ModuleStatus::Initialized));
        assert_eq!("FAILED".parse::<ModuleStatus>(), Ok(ModuleStatus::Error));
        assert!("bogus".parse::<ModuleStatus>().is_err());
    }

    #[test]
    fn test_options_builder() {
        let opts = ModuleOptions::with_priority(5).depends_on(["constants", "errors"]);
        assert_eq!(opts.priority, 5);
        assert_eq!(opts.dependencies, vec!["constants", "errors"]);
    }
}
