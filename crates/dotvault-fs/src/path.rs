//! Home-relative path expansion and permission policy

use std::path::{Path, PathBuf};

/// Mode for secret-shaped files: owner read/write only.
pub const PRIVATE_MODE: u32 = 0o600;

/// Mode for everything else.
pub const PUBLIC_MODE: u32 = 0o644;

/// Mode for directories created on demand.
pub const DIR_MODE: u32 = 0o755;

/// Directory fragments whose contents are always written private.
const SECRET_DIRS: &[&str] = &[".ssh/", ".aws/"];

/// Expand a manifest path template into an absolute path.
///
/// Handles a leading `~` or `~/`, and `$HOME` / `${HOME}` anywhere in the
/// template. Templates that are still relative after expansion are taken
/// relative to `home`.
pub fn expand_home(template: &str, home: &Path) -> PathBuf {
    let home_str = home.to_string_lossy();

    let expanded = if template == "~" {
        home_str.to_string()
    } else if let Some(rest) = template.strip_prefix("~/") {
        format!("{}/{}", home_str.trim_end_matches('/'), rest)
    } else {
        template.to_string()
    };

    let expanded = expanded
        .replace("${HOME}", &home_str)
        .replace("$HOME", &home_str);

    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        home.join(path)
    }
}

/// True when the path lives under a directory that only holds secrets.
///
/// Matching is by path substring, so `~/.ssh/config` and
/// `/home/u/.aws/credentials` both qualify.
// TODO: replace substring matching with a per-type permission table once
// manifests can declare a mode per item.
pub fn is_secret_path(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    SECRET_DIRS.iter().any(|dir| normalized.contains(dir))
}

/// Choose the file mode for a pulled file.
pub fn permission_for(path: &Path, secret_type: bool) -> u32 {
    if secret_type || is_secret_path(path) {
        PRIVATE_MODE
    } else {
        PUBLIC_MODE
    }
}

/// Validate that an identifier is safe to use as a single path component.
///
/// Rejects empty names, path separators, `..`, and NUL bytes.
pub fn validate_path_identifier(value: &str, label: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{label} must not be empty"));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(format!("{label} '{value}' must not contain path separators"));
    }
    if value == "." || value == ".." {
        return Err(format!("{label} '{value}' is not a valid name"));
    }
    if value.contains('\0') {
        return Err(format!("{label} must not contain NUL bytes"));
    }
    Ok(())
}
