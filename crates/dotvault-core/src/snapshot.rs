//! Checksum snapshot: the drift-detection baseline
//!
//! The snapshot records, per item, the checksum of the content that was last
//! synced in both directions. It is read once at the start of a run and
//! written once at the end; a run never edits the file in place.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Baseline for a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Hex SHA-256 of the converged content
    pub checksum: String,
    /// Absolute local path at the time of the sync
    pub local_path: String,
    pub synced_at: DateTime<Utc>,
}

/// Map of item name to last-synced checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumSnapshot {
    /// When the snapshot was last written
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub items: BTreeMap<String, SnapshotEntry>,
}

impl Default for ChecksumSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            items: BTreeMap::new(),
        }
    }

    /// Load a snapshot, returning an empty one when the file is absent.
    ///
    /// The file is read under a shared lock through the same handle to avoid
    /// a check-then-read race.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;

        let mut content = String::new();
        (&file).read_to_string(&mut content)?;

        serde_json::from_str(&content).map_err(|e| Error::Snapshot {
            message: format!("{} is corrupt: {}", path.display(), e),
        })
    }

    /// Serialize the snapshot in memory and write it atomically, once.
    ///
    /// Creates parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        dotvault_fs::io::write_atomic(path, content.as_bytes(), dotvault_fs::PRIVATE_MODE)?;
        Ok(())
    }

    /// Last-synced checksum, or `""` when there is no prior baseline.
    pub fn baseline(&self, name: &str) -> &str {
        self.items.get(name).map_or("", |e| e.checksum.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&SnapshotEntry> {
        self.items.get(name)
    }

    /// Record a converged checksum for an item.
    pub fn record(
        &mut self,
        name: impl Into<String>,
        checksum: impl Into<String>,
        local_path: &Path,
        synced_at: DateTime<Utc>,
    ) {
        self.items.insert(
            name.into(),
            SnapshotEntry {
                checksum: checksum.into(),
                local_path: local_path.to_string_lossy().into_owned(),
                synced_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
