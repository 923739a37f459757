//! Vault synchronization and drift-detection engine for dotvault
//!
//! This crate decides, per item, whether the local copy of a secret artifact
//! or its vault entry is authoritative, and applies that decision safely:
//!
//! - **Catalog**: the manifest of items, their local paths and types
//! - **Snapshot**: the last-synced checksum of every item (the baseline)
//! - **Backend**: a pluggable secret vault behind an async trait
//! - **SyncEngine**: sync, restore, push, check and status runs
//!
//! # Architecture
//!
//! `dotvault-core` sits above `dotvault-fs` and below the CLI:
//!
//! ```text
//!              dotvault-cli
//!                   |
//!             dotvault-core
//!                   |
//!     +------+------+------+-------+
//!     |      |      |      |       |
//!  catalog snapshot backend sync  transform
//!                   |
//!              dotvault-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dotvault_core::{BackendRegistry, Settings, SyncEngine, SyncOptions};
//!
//! async fn example(settings: Settings) -> dotvault_core::Result<()> {
//!     let engine = SyncEngine::from_settings(settings, &BackendRegistry::with_builtins())?;
//!     let summary = engine.sync(&SyncOptions::default()).await?;
//!     assert!(summary.is_success());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod backup;
pub mod catalog;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod state;
pub mod sync;
pub mod transform;

pub use backend::{Backend, BackendError, BackendRegistry, LocalBackend, MemoryBackend, Session};
pub use backup::{BackupManager, BackupMetadata, ItemBackup};
pub use catalog::{
    Catalog, ItemType, ResolvedItem, ValidationReport, VaultItemSpec, validate_catalog,
};
pub use config::{Settings, Timeouts, default_config_path};
pub use error::{Error, Result};
pub use snapshot::{ChecksumSnapshot, SnapshotEntry};
pub use state::{JsonStateStore, MemoryStateStore, StateStore};
pub use sync::{
    CheckReport, CheckStatus, Direction, DriftItem, ForceDirection, ItemAction, ItemOutcome,
    PushOptions, RestoreOptions, StatusReport, SyncEngine, SyncOptions, SyncSummary, resolve,
    resolve_checksums,
};
