//! Settings and engine construction shared by every command

use std::path::{Path, PathBuf};

use dotvault_core::{BackendRegistry, Settings, SyncEngine, default_config_path};
use tokio::runtime::Runtime;

use crate::error::Result;

/// Resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub config_path: PathBuf,
}

impl Context {
    /// Load settings from `config` (or the default location) and apply the
    /// `--backend` override.
    pub fn load(config: Option<&Path>, backend: Option<&str>) -> Result<Self> {
        let home = Settings::home_dir()?;
        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_config_path(&home));

        let mut settings = Settings::load(&config_path, home)?;
        if let Some(backend) = backend {
            settings = settings.with_backend(backend);
        }
        tracing::debug!(
            config = %config_path.display(),
            backend = %settings.backend,
            manifest = %settings.manifest_path.display(),
            "resolved settings"
        );

        Ok(Self {
            settings,
            config_path,
        })
    }

    /// Build the engine for the configured backend and manifest.
    pub fn engine(&self) -> Result<SyncEngine> {
        let registry = BackendRegistry::with_builtins();
        Ok(SyncEngine::from_settings(self.settings.clone(), &registry)?)
    }
}

/// Single-threaded runtime; items are processed strictly one at a time.
pub fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?)
}
