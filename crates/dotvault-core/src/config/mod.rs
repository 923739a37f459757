//! Run configuration
//!
//! Everything a run needs is carried by an explicit [`Settings`] value built
//! once at startup and passed into the engine: which backend to use, where the
//! manifest lives, where state (snapshot, timestamps, session, backups) is
//! kept, and how long backend calls may take.
//!
//! # Configuration file
//!
//! Loaded from `config.toml` in the platform config directory
//! (`~/.config/dotvault/` on Linux) unless a path is given. Every field is
//! optional:
//!
//! ```toml
//! backend = "local"
//! manifest = "~/.config/dotvault/manifest.json"
//! state_dir = "~/.local/state/dotvault"
//!
//! [local]
//! vault_path = "~/.local/share/dotvault/vault.json"
//!
//! [timeouts]
//! auth_secs = 120
//! item_secs = 30
//! sync_secs = 60
//! ```

mod settings;

pub use settings::{Settings, SettingsFile, Timeouts, default_config_path};
