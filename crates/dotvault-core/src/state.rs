//! Key/value persistence for run timestamps and backend choice

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dotvault_fs::ConfigStore;

use crate::Result;

pub const LAST_PUSH: &str = "vault.last_push";
pub const LAST_PULL: &str = "vault.last_pull";
pub const LAST_SYNC: &str = "vault.last_sync";
pub const BACKEND: &str = "vault.backend";

/// String key/value store
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JSON file store; every `set` rewrites the file atomically
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
    store: ConfigStore,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: ConfigStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.store.load_opt(&self.path)?.unwrap_or_default())
    }
}

impl StateStore for JsonStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read()?;
        values.insert(key.to_string(), value.to_string());
        self.store.save(&self.path, &values)?;
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        JsonStateStore::new(&path).set(LAST_SYNC, "2026-01-01T00:00:00Z").unwrap();
        JsonStateStore::new(&path).set(BACKEND, "local").unwrap();

        let reopened = JsonStateStore::new(&path);
        assert_eq!(
            reopened.get(LAST_SYNC).unwrap().as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
        assert_eq!(reopened.get(BACKEND).unwrap().as_deref(), Some("local"));
        assert_eq!(reopened.get(LAST_PUSH).unwrap(), None);
    }

    #[test]
    fn memory_store_get_set() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get(LAST_PULL).unwrap(), None);
        store.set(LAST_PULL, "now").unwrap();
        assert_eq!(store.get(LAST_PULL).unwrap().as_deref(), Some("now"));
    }
}
