//! File-backed key-value storage
//!
//! Stands in for the browser's localStorage. Values live in a JSON object in
//! one file:
//! - Linux: ~/.config/folio/storage.json
//! - macOS: ~/Library/Application Support/io.folio.folio/storage.json
//! - Windows: C:\Users\<User>\AppData\Roaming\folio\folio\config\storage.json

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use directories::ProjectDirs;
use folio_ports::outbound::StorageProvider;

#[derive(Clone)]
pub struct DesktopStorageProvider {
    storage_path: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for DesktopStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopStorageProvider {
    /// Storage in the platform config directory.
    pub fn new() -> Self {
        let storage_path = ProjectDirs::from("io", "folio", "folio")
            .map(|dirs| dirs.config_dir().join("storage.json"))
            .unwrap_or_else(|| PathBuf::from("folio_storage.json"));
        Self::at(storage_path)
    }

    /// Storage in an explicit file. Existing contents are loaded eagerly.
    pub fn at(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let cache = read_store(&storage_path);
        tracing::debug!(path = ?storage_path, entries = cache.len(), "Storage initialized");
        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    fn persist(&self) {
        if let Some(parent) = self.storage_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!(error = %e, "Failed to create storage directory");
                return;
            }
        }

        let data = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*cache)
        };
        match data {
            Ok(data) => {
                if let Err(e) = fs::write(&self.storage_path, data) {
                    tracing::error!(error = %e, path = ?self.storage_path, "Failed to write storage file");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize storage data"),
        }
    }
}

fn read_store(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to parse storage file");
            HashMap::new()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read storage file");
            HashMap::new()
        }
    }
}

impl StorageProvider for DesktopStorageProvider {
    fn save(&self, key: &str, value: &str) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn load(&self, key: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &str) {
        let removed = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("storage.json");

        let storage = DesktopStorageProvider::at(&path);
        storage.save("folio_error_log", "[]");
        storage.save("theme", "dark");
        storage.remove("theme");

        let reopened = DesktopStorageProvider::at(&path);
        assert_eq!(reopened.load("folio_error_log").as_deref(), Some("[]"));
        assert_eq!(reopened.load("theme"), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").expect("write");

        let storage = DesktopStorageProvider::at(&path);
        assert_eq!(storage.load("anything"), None);

        storage.save("key", "value");
        assert_eq!(DesktopStorageProvider::at(&path).load("key").as_deref(), Some("value"));
    }
}
