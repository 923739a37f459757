//! Error types for dotvault-core

use std::path::PathBuf;

use crate::backend::BackendError;

/// Result type for dotvault-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dotvault-core operations
///
/// Every variant here is run-scoped: it aborts a run before any mutation.
/// Item-scoped failures are folded into an `ItemOutcome` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest is not valid JSON or does not match the schema
    #[error("Malformed manifest {path}: {message}")]
    Schema { path: PathBuf, message: String },

    /// A manifest item lacks a required field
    #[error("Manifest item '{item}' is missing required field '{field}'")]
    MissingField { item: String, field: String },

    /// Manifest file does not exist
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Authentication against the backend failed or timed out
    #[error("Authentication with '{backend}' failed: {reason}")]
    Auth { backend: String, reason: String },

    /// No backend is registered under this name
    #[error("Unknown backend '{name}' (available: {available})")]
    UnknownBackend { name: String, available: String },

    /// Named item is not in the catalog
    #[error("Unknown item '{name}'")]
    UnknownItem { name: String },

    /// Restore pre-flight found local edits that were never synced
    #[error(
        "Refusing to restore: local changes not yet synced for {}. Re-run with --force to overwrite",
        .items.join(", ")
    )]
    UnsyncedLocalChanges { items: Vec<String> },

    /// Push pre-flight found vault edits that were never synced
    #[error(
        "Refusing to push: vault changes not yet synced for {}. Re-run with --force to overwrite",
        .items.join(", ")
    )]
    UnsyncedVaultChanges { items: Vec<String> },

    /// Snapshot file exists but cannot be used
    #[error("Checksum snapshot error: {message}")]
    Snapshot { message: String },

    /// A backup could not be created or read
    #[error("Backup error: {message}")]
    Backup { message: String },

    /// Backend failure outside an item scope
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Filesystem error from dotvault-fs
    #[error(transparent)]
    Fs(#[from] dotvault_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
