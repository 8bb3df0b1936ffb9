//! Filesystem primitives used by the tree builder

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// Ensure `path` exists as a directory, creating missing ancestors.
///
/// A no-op when the directory is already there. Fails if `path` (or one of
/// its ancestors) exists as something other than a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(?path, "Created directory");
    Ok(())
}

/// Write `content` to `path`, creating or truncating the file.
///
/// The parent directory must already exist.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.write_all(content).map_err(|e| Error::io(path, e))?;
    file.flush().map_err(|e| Error::io(path, e))?;

    tracing::debug!(?path, bytes = content.len(), "Wrote file");
    Ok(())
}

/// Recursively delete the directory at `path`.
///
/// Returns `false` without touching anything if there is no directory.
pub fn remove_dir_tree(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(true)
}
