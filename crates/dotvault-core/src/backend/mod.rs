//! Vault backend abstraction
//!
//! A backend is the one stateful external resource of a run: an authenticated
//! session against a secret store holding one secure note per item name.
//! Concrete password-manager CLIs sit behind the [`Backend`] trait so the
//! resolver and orchestrator can be exercised against [`MemoryBackend`].

mod local;
mod memory;
mod registry;
mod session;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use registry::{BackendFactory, BackendRegistry};
pub use session::{Session, SessionCache};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors reported by a backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The vault has no entry with this name
    #[error("Vault item '{name}' not found")]
    NotFound { name: String },

    /// Credentials rejected or vault locked
    #[error("Not authenticated: {reason}")]
    Auth { reason: String },

    /// The session handle is no longer valid
    #[error("Session expired")]
    SessionExpired,

    /// The call did not complete within its deadline
    #[error("{op} timed out after {secs}s")]
    Timeout { op: String, secs: u64 },

    /// The backend's storage failed
    #[error("Backend storage error: {message}")]
    Storage { message: String },

    /// The backend does not implement this operation
    #[error("Operation '{op}' is not supported by this backend")]
    Unsupported { op: String },
}

impl BackendError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Operations the sync engine consumes from a secret vault.
///
/// Every call is awaited under a deadline by the caller; implementations
/// should not impose their own. `create_item` and `update_item` each act on
/// at most one logical entry per name and are safe to retry.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Registry name of this backend
    fn name(&self) -> &str;

    /// Prepare the backend (locate binaries, create storage).
    async fn init(&self) -> BackendResult<()>;

    /// Whether an authenticated state already exists.
    async fn is_authenticated(&self) -> bool;

    /// Open a new session.
    async fn authenticate(&self) -> BackendResult<Session>;

    /// Full note content of the named entry, or `BackendError::NotFound`.
    async fn get_notes(&self, name: &str, session: &Session) -> BackendResult<String>;

    async fn create_item(&self, name: &str, content: &str, session: &Session) -> BackendResult<()>;

    async fn update_item(&self, name: &str, content: &str, session: &Session) -> BackendResult<()>;

    async fn delete_item(&self, name: &str, session: &Session) -> BackendResult<()>;

    /// Names of every entry in the vault.
    async fn list_items(&self, session: &Session) -> BackendResult<Vec<String>>;

    /// Push pending local vault state to the remote service.
    async fn sync(&self, session: &Session) -> BackendResult<()>;

    /// Release the session and any held resources.
    async fn close(&self) -> BackendResult<()>;
}

/// Await a backend call, failing with `BackendError::Timeout` past `limit`.
pub async fn with_deadline<T, F>(op: &str, limit: Duration, call: F) -> BackendResult<T>
where
    F: Future<Output = BackendResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, secs = limit.as_secs(), "backend call timed out");
            Err(BackendError::Timeout {
                op: op.to_string(),
                secs: limit.as_secs(),
            })
        }
    }
}
