//! [`TestHome`] builder for dotvault test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Manifest location relative to the home directory
pub const MANIFEST_PATH: &str = ".config/dotvault/manifest.json";
/// Settings file location relative to the home directory
pub const CONFIG_PATH: &str = ".config/dotvault/config.toml";
/// Local backend vault relative to the home directory
pub const VAULT_PATH: &str = ".local/share/dotvault/vault.json";
/// State directory relative to the home directory
pub const STATE_DIR: &str = ".local/state/dotvault";

/// A temporary home directory with helper methods for test setup and
/// assertion.
///
/// Every path argument is relative to the home root.
///
/// # Example
///
/// ```rust,no_run
/// use dotvault_test_utils::TestHome;
/// use serde_json::json;
///
/// let home = TestHome::new();
/// home.write_manifest(&json!({
///     "vault_items": { "Git-Config": { "path": "~/.gitconfig", "type": "file" } }
/// }));
/// home.write_file(".gitconfig", "[user]\n");
/// home.assert_file_exists(".gitconfig");
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Create an empty temporary home.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary home.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel`.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path(MANIFEST_PATH)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path(CONFIG_PATH)
    }

    pub fn vault_path(&self) -> PathBuf {
        self.path(VAULT_PATH)
    }

    pub fn state_path(&self, file: &str) -> PathBuf {
        self.path(STATE_DIR).join(file)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Read `rel` as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_file(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Write the manifest at its default location.
    pub fn write_manifest(&self, manifest: &Value) -> PathBuf {
        self.write_file(MANIFEST_PATH, &serde_json::to_string_pretty(manifest).unwrap())
    }

    /// Write a settings file pointing at this home's default locations.
    pub fn write_config(&self, backend: &str) -> PathBuf {
        self.write_file(CONFIG_PATH, &format!("backend = \"{backend}\"\n"))
    }

    /// Seed the local backend's vault file with notes.
    pub fn write_local_vault(&self, notes: &[(&str, &str)]) -> PathBuf {
        let items: serde_json::Map<String, Value> = notes
            .iter()
            .map(|(name, content)| {
                (
                    name.to_string(),
                    json!({ "notes": content, "updated_at": "2026-01-01T00:00:00Z" }),
                )
            })
            .collect();
        self.write_file(
            VAULT_PATH,
            &serde_json::to_string_pretty(&json!({ "items": items })).unwrap(),
        )
    }

    /// Note content held by the local backend's vault file.
    pub fn local_vault_note(&self, name: &str) -> Option<String> {
        let content = fs::read_to_string(self.vault_path()).ok()?;
        let vault: Value = serde_json::from_str(&content).ok()?;
        vault["items"][name]["notes"].as_str().map(str::to_string)
    }

    /// Permission bits of `rel`.
    #[cfg(unix)]
    pub fn mode(&self, rel: &str) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(self.path(rel)).unwrap().permissions().mode() & 0o777
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read_file(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}
