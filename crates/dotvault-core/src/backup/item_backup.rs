//! Item backup implementation
//!
//! Handles creating and listing per-item backups.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dotvault_fs::{PRIVATE_MODE, io, validate_path_identifier};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One copy of an overwritten file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Absolute path the file was copied from
    pub source: String,
    /// File name of the copy inside the item's backup directory
    pub file: String,
    pub created: DateTime<Utc>,
}

/// Contents of an item's `metadata.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Item name
    pub item: String,
    /// Copies in creation order
    #[serde(default)]
    pub entries: Vec<BackupEntry>,
}

impl BackupMetadata {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            entries: Vec::new(),
        }
    }

    /// Most recent copy, if any
    pub fn latest(&self) -> Option<&BackupEntry> {
        self.entries.last()
    }
}

/// Information about an item's backups
#[derive(Debug, Clone)]
pub struct ItemBackup {
    pub item: String,
    /// Path to the item's backup directory
    pub path: PathBuf,
    pub metadata: BackupMetadata,
}

impl ItemBackup {
    /// Absolute path of the most recent copy
    pub fn latest_path(&self) -> Option<PathBuf> {
        self.metadata.latest().map(|entry| self.path.join(&entry.file))
    }
}

/// Manages backups under a single directory
#[derive(Debug, Clone)]
pub struct BackupManager {
    backups_dir: PathBuf,
}

impl BackupManager {
    pub fn new(backups_dir: impl Into<PathBuf>) -> Self {
        Self {
            backups_dir: backups_dir.into(),
        }
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Item names end up as directory names.
    fn validate_item_name(item: &str) -> Result<()> {
        validate_path_identifier(item, "Item name").map_err(|message| Error::Backup { message })
    }

    fn item_backup_dir(&self, item: &str) -> PathBuf {
        self.backups_dir.join(item)
    }

    fn metadata_path(&self, item: &str) -> PathBuf {
        self.item_backup_dir(item).join("metadata.toml")
    }

    pub fn has_backup(&self, item: &str) -> bool {
        self.metadata_path(item).exists()
    }

    /// Copy `source` into the item's backup directory.
    ///
    /// Returns `None` without touching anything when `source` does not exist.
    pub fn create_backup(&self, item: &str, source: &Path) -> Result<Option<ItemBackup>> {
        Self::validate_item_name(item)?;
        if !source.is_file() {
            return Ok(None);
        }

        let backup_dir = self.item_backup_dir(item);
        fs::create_dir_all(&backup_dir)?;

        let created = Utc::now();
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("backup");
        let stamp = created.format("%Y%m%dT%H%M%S%.3fZ");
        let mut copy_name = format!("{file_name}.{stamp}");
        let mut suffix = 1;
        while backup_dir.join(&copy_name).exists() {
            copy_name = format!("{file_name}.{stamp}-{suffix}");
            suffix += 1;
        }

        io::copy_file(source, &backup_dir.join(&copy_name))?;

        let mut metadata = self
            .get_backup(item)?
            .map(|backup| backup.metadata)
            .unwrap_or_else(|| BackupMetadata::new(item));
        metadata.entries.push(BackupEntry {
            source: source.display().to_string(),
            file: copy_name,
            created,
        });
        let metadata_content = toml::to_string_pretty(&metadata)?;
        io::write_text(&self.metadata_path(item), &metadata_content, PRIVATE_MODE)?;

        tracing::info!(item, source = %source.display(), "backed up local file");

        Ok(Some(ItemBackup {
            item: item.to_string(),
            path: backup_dir,
            metadata,
        }))
    }

    /// Get backup information for an item
    pub fn get_backup(&self, item: &str) -> Result<Option<ItemBackup>> {
        Self::validate_item_name(item)?;
        let metadata_path = self.metadata_path(item);

        let Some(content) = io::read_text_opt(&metadata_path)? else {
            return Ok(None);
        };
        let metadata: BackupMetadata = toml::from_str(&content)?;

        Ok(Some(ItemBackup {
            item: item.to_string(),
            path: self.item_backup_dir(item),
            metadata,
        }))
    }

    /// List all available backups
    pub fn list_backups(&self) -> Result<Vec<ItemBackup>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();

            if path.is_dir()
                && let Some(item) = path.file_name().and_then(|n| n.to_str())
                && let Ok(Some(backup)) = self.get_backup(item)
            {
                backups.push(backup);
            }
        }

        backups.sort_by(|a, b| a.item.cmp(&b.item));
        Ok(backups)
    }
}
