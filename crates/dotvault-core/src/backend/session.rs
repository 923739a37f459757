//! Backend sessions and the on-disk session cache

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dotvault_fs::{ConfigStore, PRIVATE_MODE};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Opaque handle to an authenticated backend session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    backend: String,
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(backend: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// Tokens never show up in logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session file holding at most one cached session
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached session for `backend`, if one exists and has not expired.
    ///
    /// An unreadable cache is treated as empty.
    pub fn load(&self, backend: &str) -> Option<Session> {
        let session: Session = match ConfigStore::new().load_opt(&self.path) {
            Ok(session) => session?,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable session cache");
                return None;
            }
        };
        (session.backend == backend && !session.is_expired(Utc::now())).then_some(session)
    }

    /// Persist a session with owner-only permissions.
    pub fn store(&self, session: &Session) -> Result<()> {
        ConfigStore::with_mode(PRIVATE_MODE).save(&self.path, session)?;
        Ok(())
    }
}
