//! Item catalog: the manifest of local paths and their vault entries
//!
//! The manifest is a JSON document with three sections:
//!
//! ```json
//! {
//!   "vault_items": {
//!     "SSH-GitHub": { "path": "~/.ssh/id_ed25519_github", "type": "sshkey", "required": true },
//!     "AWS-Credentials": { "path": "~/.aws/credentials", "type": "file", "required": true }
//!   },
//!   "ssh_keys": { "SSH-Work": "~/.ssh/id_ed25519_work" },
//!   "syncable_items": { "Git-Config": "~/.gitconfig" }
//! }
//! ```
//!
//! `syncable_items` names the default set for a plain `sync`; when the section
//! is absent every `vault_items` entry is syncable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use dotvault_fs::{expand_home, validate_path_identifier};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Item whose content is always treated as a bundle of environment secrets.
pub const ENV_BUNDLE_ITEM: &str = "Environment-Secrets";

/// How an item's content maps onto local files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Content written verbatim
    File,
    /// Private key plus an optional `.pub` companion
    SshKey,
    /// `KEY=VALUE` lines plus a generated loader script
    Env,
    /// Synced as a single file at the item path
    Directory,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::SshKey => "sshkey",
            Self::Env => "env",
            Self::Directory => "directory",
        }
    }

    /// Types whose content is a secret regardless of where it is written.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::SshKey)
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "" => Ok(Self::File),
            "sshkey" | "ssh_key" | "ssh-key" | "ssh" => Ok(Self::SshKey),
            "env" | "environment" => Ok(Self::Env),
            "directory" | "dir" => Ok(Self::Directory),
            other => Err(format!("unrecognized item type '{other}'")),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItemSpec {
    /// Vault entry name and join key
    pub name: String,
    /// Local path template; may contain `~` or `$HOME`
    pub path: String,
    pub item_type: ItemType,
    pub required: bool,
}

impl VaultItemSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            item_type,
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Env-typed, or the bundled environment secrets item.
    pub fn is_env_bundle(&self) -> bool {
        self.item_type == ItemType::Env || self.name == ENV_BUNDLE_ITEM
    }

    /// Expand the path template against `home`.
    pub fn resolve(&self, home: &Path) -> ResolvedItem {
        ResolvedItem {
            spec: self.clone(),
            path: expand_home(&self.path, home),
        }
    }
}

/// A catalog entry with its absolute local path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub spec: VaultItemSpec,
    pub path: PathBuf,
}

impl ResolvedItem {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn item_type(&self) -> ItemType {
        self.spec.item_type
    }

    pub fn required(&self) -> bool {
        self.spec.required
    }
}

/// Entry counts per manifest section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    pub vault_items: usize,
    pub ssh_keys: usize,
    pub syncable_items: usize,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    vault_items: BTreeMap<String, RawItem>,
    #[serde(default)]
    ssh_keys: BTreeMap<String, String>,
    #[serde(default)]
    syncable_items: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    path: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    #[serde(default)]
    required: bool,
}

/// The validated manifest, keyed by item name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<String, VaultItemSpec>,
    syncable: Vec<String>,
    warnings: Vec<String>,
    counts: SectionCounts,
}

impl Catalog {
    /// Load and validate a manifest file.
    ///
    /// # Errors
    ///
    /// `Error::ManifestNotFound` if the file is absent, `Error::Schema` on
    /// malformed JSON, `Error::MissingField` if an item has no path.
    /// Unrecognized item types only produce warnings.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_manifest(path)?;
        Self::parse(path, &content)
    }

    /// Parse manifest content; `path` is used only for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let (catalog, mut errors) = build(path, content);
        if errors.is_empty() {
            for warning in &catalog.warnings {
                tracing::warn!("{}", warning);
            }
            Ok(catalog)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Build a catalog from specs directly.
    pub fn from_specs(specs: impl IntoIterator<Item = VaultItemSpec>) -> Self {
        let items: BTreeMap<_, _> = specs.into_iter().map(|s| (s.name.clone(), s)).collect();
        let syncable: Vec<_> = items.keys().cloned().collect();
        let counts = SectionCounts {
            vault_items: items.len(),
            ssh_keys: 0,
            syncable_items: syncable.len(),
        };
        Self {
            items,
            syncable,
            warnings: Vec::new(),
            counts,
        }
    }

    pub fn get(&self, name: &str) -> Option<&VaultItemSpec> {
        self.items.get(name)
    }

    /// All items in name order.
    pub fn items(&self) -> impl Iterator<Item = &VaultItemSpec> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn counts(&self) -> SectionCounts {
        self.counts
    }

    /// Look up the named items, failing on the first unknown name.
    pub fn select(&self, names: &[String]) -> Result<Vec<&VaultItemSpec>> {
        names
            .iter()
            .map(|name| {
                self.items
                    .get(name)
                    .ok_or_else(|| Error::UnknownItem { name: name.clone() })
            })
            .collect()
    }

    /// The syncable subset, in name order.
    pub fn syncable(&self) -> Vec<&VaultItemSpec> {
        self.syncable
            .iter()
            .filter_map(|name| self.items.get(name))
            .collect()
    }
}

/// Result of validating a manifest without using it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub counts: SectionCounts,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every catalog check and collect all findings.
///
/// Unlike [`Catalog::load`] this never stops at the first error.
pub fn validate_catalog(path: &Path) -> ValidationReport {
    let content = match read_manifest(path) {
        Ok(content) => content,
        Err(e) => {
            return ValidationReport {
                errors: vec![e.to_string()],
                ..Default::default()
            };
        }
    };

    let (catalog, errors) = build(path, &content);
    ValidationReport {
        counts: catalog.counts,
        warnings: catalog.warnings,
        errors: errors.iter().map(ToString::to_string).collect(),
    }
}

fn read_manifest(path: &Path) -> Result<String> {
    match dotvault_fs::io::read_text(path) {
        Ok(content) => Ok(content),
        Err(e) if e.is_not_found() => Err(Error::ManifestNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn build(path: &Path, content: &str) -> (Catalog, Vec<Error>) {
    let raw: RawManifest = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(e) => {
            let err = Error::Schema {
                path: path.to_path_buf(),
                message: e.to_string(),
            };
            return (Catalog::default(), vec![err]);
        }
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut items = BTreeMap::new();
    let mut vault_names = Vec::new();

    let counts = SectionCounts {
        vault_items: raw.vault_items.len(),
        ssh_keys: raw.ssh_keys.len(),
        syncable_items: raw
            .syncable_items
            .as_ref()
            .map_or(raw.vault_items.len(), BTreeMap::len),
    };

    for (name, item) in raw.vault_items {
        if let Err(message) = validate_path_identifier(&name, "Item name") {
            errors.push(Error::Schema {
                path: path.to_path_buf(),
                message,
            });
            continue;
        }
        let Some(item_path) = item.path.filter(|p| !p.trim().is_empty()) else {
            errors.push(Error::MissingField {
                item: name,
                field: "path".to_string(),
            });
            continue;
        };
        let item_type = match item.item_type.as_deref().map(str::parse::<ItemType>) {
            None => ItemType::File,
            Some(Ok(t)) => t,
            Some(Err(reason)) => {
                warnings.push(format!("Item '{name}': {reason}; treating as file"));
                ItemType::File
            }
        };
        vault_names.push(name.clone());
        items.insert(
            name.clone(),
            VaultItemSpec::new(name, item_path, item_type).required(item.required),
        );
    }

    for (name, key_path) in raw.ssh_keys {
        if items.contains_key(&name) {
            continue;
        }
        if let Err(message) = validate_path_identifier(&name, "SSH key name") {
            errors.push(Error::Schema {
                path: path.to_path_buf(),
                message,
            });
            continue;
        }
        items.insert(name.clone(), VaultItemSpec::new(name, key_path, ItemType::SshKey));
    }

    let syncable = match raw.syncable_items {
        Some(syncable) => {
            let mut names = Vec::with_capacity(syncable.len());
            for (name, sync_path) in syncable {
                if !items.contains_key(&name) {
                    if let Err(message) = validate_path_identifier(&name, "Syncable item name") {
                        errors.push(Error::Schema {
                            path: path.to_path_buf(),
                            message,
                        });
                        continue;
                    }
                    items.insert(name.clone(), VaultItemSpec::new(&name, sync_path, ItemType::File));
                }
                names.push(name);
            }
            names
        }
        None => vault_names,
    };

    let catalog = Catalog {
        items,
        syncable,
        warnings,
        counts,
    };
    (catalog, errors)
}
