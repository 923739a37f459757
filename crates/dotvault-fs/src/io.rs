//! Atomic I/O operations with file locking and permission modes

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::path::DIR_MODE;
use crate::{Error, Result};

/// Write content atomically to a file, applying `mode` before the rename.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
/// The temp file is created in the same directory (same filesystem) and is
/// chmod-ed before it replaces the target, so a secret never exists at its
/// final path with a looser mode.
pub fn write_atomic(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    ensure_parent_dir(path)?;

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    set_mode(&temp_path, mode)?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .unlock()
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(path, e));
    }

    tracing::debug!(path = %path.display(), mode = format_args!("{mode:o}"), "wrote file");
    Ok(())
}

/// Write text content atomically with the given mode.
pub fn write_text(path: &Path, content: &str, mode: u32) -> Result<()> {
    write_atomic(path, content.as_bytes(), mode)
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content, mapping a missing file to `None`.
pub fn read_text_opt(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Remove a file. Returns `false` when there was nothing to remove.
pub fn remove_file_opt(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Create the parent directory of `path` (mode 0755) if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    set_mode(parent, DIR_MODE)
}

/// Copy `from` to `to`, creating the destination directory.
///
/// The source is left untouched; this is never a move.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    ensure_parent_dir(to)?;
    fs::copy(from, to).map_err(|e| Error::io(from, e))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
