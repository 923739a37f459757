//! Backend factory map
//!
//! Built once at startup; associates a backend name with a constructor.

use std::collections::BTreeMap;

use super::{Backend, LocalBackend, MemoryBackend};
use crate::config::Settings;
use crate::{Error, Result};

/// Constructor for a backend from run settings
pub type BackendFactory = fn(&Settings) -> Box<dyn Backend>;

/// Registry mapping backend names to constructors.
///
/// # Example
///
/// ```
/// use dotvault_core::backend::BackendRegistry;
///
/// let registry = BackendRegistry::with_builtins();
/// assert!(registry.contains("local"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in backends.
    ///
    /// Currently registers:
    /// - `local` -> JSON vault file at `Settings::vault_path`
    /// - `memory` -> in-process store, discarded at exit
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("local", |settings| {
            Box::new(LocalBackend::new(settings.vault_path.clone()))
        });
        registry.register("memory", |_| Box::new(MemoryBackend::new()));
        registry
    }

    /// Register a constructor, replacing any previous one for `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct the backend named by `settings.backend`.
    pub fn create(&self, settings: &Settings) -> Result<Box<dyn Backend>> {
        let factory = self
            .factories
            .get(&settings.backend)
            .ok_or_else(|| Error::UnknownBackend {
                name: settings.backend.clone(),
                available: self.names().join(", "),
            })?;
        tracing::debug!(backend = %settings.backend, "constructing backend");
        Ok(factory(settings))
    }
}
