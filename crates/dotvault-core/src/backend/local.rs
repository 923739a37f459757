//! File-backed backend
//!
//! Stores every note in a single JSON document on local disk. Useful as a
//! vault on a synced folder and as the end-to-end test backend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dotvault_fs::PRIVATE_MODE;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Backend, BackendError, BackendResult, Session};

/// Lifetime of a local session
const SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredNote {
    notes: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultFile {
    #[serde(default)]
    items: BTreeMap<String, StoredNote>,
}

/// Backend storing notes in `vault.json`
#[derive(Debug, Clone)]
pub struct LocalBackend {
    path: PathBuf,
}

impl LocalBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as an empty vault.
    fn read(&self) -> BackendResult<VaultFile> {
        let content = dotvault_fs::io::read_text_opt(&self.path)
            .map_err(|e| BackendError::storage(e.to_string()))?;
        match content {
            Some(content) => serde_json::from_str(&content).map_err(|e| {
                BackendError::storage(format!("{} is corrupt: {}", self.path.display(), e))
            }),
            None => Ok(VaultFile::default()),
        }
    }

    /// Creates the vault directory on first write.
    fn write(&self, vault: &VaultFile) -> BackendResult<()> {
        let mut content = serde_json::to_string_pretty(vault)
            .map_err(|e| BackendError::storage(e.to_string()))?;
        content.push('\n');
        dotvault_fs::io::write_atomic(&self.path, content.as_bytes(), PRIVATE_MODE)
            .map_err(|e| BackendError::storage(e.to_string()))
    }

    fn check_session(&self, session: &Session) -> BackendResult<()> {
        if session.backend() != self.name() {
            return Err(BackendError::Auth {
                reason: format!("session belongs to backend '{}'", session.backend()),
            });
        }
        if session.is_expired(Utc::now()) {
            return Err(BackendError::SessionExpired);
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn init(&self) -> BackendResult<()> {
        if self.path.is_dir() {
            return Err(BackendError::storage(format!(
                "{} is a directory, expected a vault file",
                self.path.display()
            )));
        }
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        !self.path.is_dir()
    }

    async fn authenticate(&self) -> BackendResult<Session> {
        // Reading validates the vault file before any item is touched.
        self.read()?;
        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        Ok(Session::new(self.name(), Uuid::new_v4().to_string()).with_expiry(expires_at))
    }

    async fn get_notes(&self, name: &str, session: &Session) -> BackendResult<String> {
        self.check_session(session)?;
        let vault = self.read()?;
        vault
            .items
            .get(name)
            .map(|note| note.notes.clone())
            .ok_or_else(|| BackendError::NotFound {
                name: name.to_string(),
            })
    }

    async fn create_item(&self, name: &str, content: &str, session: &Session) -> BackendResult<()> {
        self.check_session(session)?;
        let mut vault = self.read()?;
        vault.items.insert(
            name.to_string(),
            StoredNote {
                notes: content.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.write(&vault)
    }

    async fn update_item(&self, name: &str, content: &str, session: &Session) -> BackendResult<()> {
        self.check_session(session)?;
        let mut vault = self.read()?;
        let note = vault.items.get_mut(name).ok_or_else(|| BackendError::NotFound {
            name: name.to_string(),
        })?;
        note.notes = content.to_string();
        note.updated_at = Utc::now();
        self.write(&vault)
    }

    async fn delete_item(&self, name: &str, session: &Session) -> BackendResult<()> {
        self.check_session(session)?;
        let mut vault = self.read()?;
        if vault.items.remove(name).is_none() {
            return Err(BackendError::NotFound {
                name: name.to_string(),
            });
        }
        self.write(&vault)
    }

    async fn list_items(&self, session: &Session) -> BackendResult<Vec<String>> {
        self.check_session(session)?;
        Ok(self.read()?.items.into_keys().collect())
    }

    async fn sync(&self, session: &Session) -> BackendResult<()> {
        // Writes are already durable; nothing to push.
        self.check_session(session)
    }

    async fn close(&self) -> BackendResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn notes_persist_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let backend = LocalBackend::new(&path);
        backend.init().await.unwrap();
        let session = backend.authenticate().await.unwrap();
        backend.create_item("Git-Config", "[user]\n", &session).await.unwrap();
        backend.update_item("Git-Config", "[core]\n", &session).await.unwrap();

        let reopened = LocalBackend::new(&path);
        let session = reopened.authenticate().await.unwrap();
        assert_eq!(reopened.get_notes("Git-Config", &session).await.unwrap(), "[core]\n");
        assert_eq!(reopened.list_items(&session).await.unwrap(), vec!["Git-Config"]);
    }

    #[tokio::test]
    async fn corrupt_vault_fails_authentication() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, "{{{").unwrap();

        let backend = LocalBackend::new(&path);
        assert!(backend.authenticate().await.is_err());
    }

    #[tokio::test]
    async fn foreign_session_is_rejected() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path().join("vault.json"));
        let foreign = Session::new("memory", "t");

        assert!(matches!(
            backend.get_notes("x", &foreign).await,
            Err(BackendError::Auth { .. })
        ));
    }

    #[tokio::test]
    async fn reads_leave_missing_vault_dir_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("share").join("dotvault").join("vault.json");

        let backend = LocalBackend::new(&path);
        backend.init().await.unwrap();
        let session = backend.authenticate().await.unwrap();
        assert!(matches!(
            backend.get_notes("Git-Config", &session).await,
            Err(BackendError::NotFound { .. })
        ));
        assert!(!dir.path().join("share").exists());

        backend.create_item("Git-Config", "[user]\n", &session).await.unwrap();
        assert!(path.exists());
    }
}
