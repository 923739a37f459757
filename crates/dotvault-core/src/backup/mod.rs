//! Backups of local files before a pull overwrites them
//!
//! Backups are stored at `<state_dir>/backups/<item>/` with:
//! - metadata.toml: every copy taken for the item and where it came from
//! - Timestamped copies of the overwritten file
//!
//! Files are copied, never moved, so the original stays in place until the
//! atomic write replaces it.

mod item_backup;

pub use item_backup::{BackupEntry, BackupManager, BackupMetadata, ItemBackup};
