//! Settings file parsing and resolution

use std::path::{Path, PathBuf};
use std::time::Duration;

use dotvault_fs::{ConfigStore, expand_home};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_BACKEND: &str = "local";
const DEFAULT_MANIFEST: &str = "~/.config/dotvault/manifest.json";
const DEFAULT_STATE_DIR: &str = "~/.local/state/dotvault";
const DEFAULT_VAULT_PATH: &str = "~/.local/share/dotvault/vault.json";

/// Location of the settings file when none is given explicitly.
pub fn default_config_path(home: &Path) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home.join(".config"))
        .join("dotvault")
        .join("config.toml")
}

/// `[local]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSection {
    pub vault_path: String,
}

impl Default for LocalSection {
    fn default() -> Self {
        Self {
            vault_path: DEFAULT_VAULT_PATH.to_string(),
        }
    }
}

/// `[timeouts]` section, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    pub auth_secs: u64,
    pub item_secs: u64,
    pub sync_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            auth_secs: 120,
            item_secs: 30,
            sync_secs: 60,
        }
    }
}

/// The settings file as written by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub backend: String,
    pub manifest: String,
    pub state_dir: String,
    pub local: LocalSection,
    pub timeouts: TimeoutsSection,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            state_dir: DEFAULT_STATE_DIR.to_string(),
            local: LocalSection::default(),
            timeouts: TimeoutsSection::default(),
        }
    }
}

/// Deadlines for backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// `authenticate`; a timeout here is fatal to the run
    pub auth: Duration,
    /// `get_notes`, `create_item`, `update_item`, `delete_item`
    pub item: Duration,
    /// `sync`
    pub sync: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        TimeoutsSection::default().into()
    }
}

impl From<TimeoutsSection> for Timeouts {
    fn from(section: TimeoutsSection) -> Self {
        Self {
            auth: Duration::from_secs(section.auth_secs),
            item: Duration::from_secs(section.item_secs),
            sync: Duration::from_secs(section.sync_secs),
        }
    }
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Home directory used to expand `~` and `$HOME`
    pub home: PathBuf,
    /// Backend registry name
    pub backend: String,
    pub manifest_path: PathBuf,
    /// Holds the snapshot, state file, session cache and backups
    pub state_dir: PathBuf,
    /// Vault file of the `local` backend
    pub vault_path: PathBuf,
    pub timeouts: Timeouts,
}

impl Settings {
    /// Default settings rooted at `home`.
    pub fn for_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self::from_file(SettingsFile::default(), home)
    }

    /// Resolve a parsed settings file against `home`.
    pub fn from_file(file: SettingsFile, home: PathBuf) -> Self {
        Self {
            backend: file.backend,
            manifest_path: expand_home(&file.manifest, &home),
            state_dir: expand_home(&file.state_dir, &home),
            vault_path: expand_home(&file.local.vault_path, &home),
            timeouts: file.timeouts.into(),
            home,
        }
    }

    /// Load settings from `config_path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid TOML.
    pub fn load(config_path: &Path, home: impl Into<PathBuf>) -> Result<Self> {
        let file: SettingsFile = ConfigStore::new()
            .load_opt(config_path)?
            .unwrap_or_default();
        tracing::debug!(path = %config_path.display(), backend = %file.backend, "loaded settings");
        Ok(Self::from_file(file, home.into()))
    }

    /// The current user's home directory.
    pub fn home_dir() -> Result<PathBuf> {
        dirs::home_dir().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory",
            ))
        })
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join("checksums.json")
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.state_dir.join("backups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn defaults_expand_against_home() {
        let settings = Settings::for_home("/home/dev");
        assert_eq!(settings.backend, "local");
        assert_eq!(
            settings.manifest_path,
            PathBuf::from("/home/dev/.config/dotvault/manifest.json")
        );
        assert_eq!(
            settings.snapshot_path(),
            PathBuf::from("/home/dev/.local/state/dotvault/checksums.json")
        );
        assert_eq!(settings.timeouts.auth, Duration::from_secs(120));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("config.toml"), dir.path()).unwrap();
        assert_eq!(settings, Settings::for_home(dir.path()));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            "backend = \"memory\"\n\n[timeouts]\nitem_secs = 5\n",
        )
        .unwrap();

        let settings = Settings::load(&config, dir.path()).unwrap();
        assert_eq!(settings.backend, "memory");
        assert_eq!(settings.timeouts.item, Duration::from_secs(5));
        assert_eq!(settings.timeouts.sync, Duration::from_secs(60));
    }
}
