use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use hotbind_common::ConfigError;
use tempfile::Builder;

/// Replace `path` with `contents`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Write through a temporary `name.<random>.tmp` next to `path`, flush it
/// to disk, then rename it over `path`.
///
/// The target only ever holds its previous full content or the new full
/// content. On any failure the temporary file is removed when the handle
/// drops.
pub(crate) fn write_atomic_with(
    path: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<()>,
) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .ok_or_else(|| ConfigError::io(path, io::Error::other("path has no parent directory")))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = Builder::new()
        .prefix(&format!("{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConfigError::io(dir, e))?;

    fill(tmp.as_file_mut()).map_err(|e| ConfigError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ConfigError::io(tmp.path(), e))?;

    tmp.persist(path)
        .map_err(|e| ConfigError::io(path, e.error))?;
    Ok(())
}
