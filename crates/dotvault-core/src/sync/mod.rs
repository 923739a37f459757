//! Vault synchronization
//!
//! This module provides:
//! - **direction**: decide per item whether local or vault is authoritative
//! - **executor**: apply a push or pull to one item
//! - **engine**: run sync, restore, push, check and status over the catalog
//! - **check** / **report**: result types for drift checks and runs

mod check;
mod direction;
mod engine;
mod executor;
mod report;

pub use check::{CheckReport, CheckStatus, DriftItem};
pub use direction::{Direction, ForceDirection, resolve, resolve_checksums};
pub use engine::{ItemStatus, PushOptions, RestoreOptions, StatusReport, SyncEngine, SyncOptions};
pub use executor::{Executor, ItemError, env_loader_path, public_key_path, read_local};
pub use report::{ItemAction, ItemOutcome, SyncSummary};
