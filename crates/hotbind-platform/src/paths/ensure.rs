use std::fs;
use std::path::Path;

use hotbind_common::PlatformError;

/// Creates the directory holding `path` if it does not already exist.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PlatformError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|e| {
        PlatformError::PathError(format!("failed to create {}: {e}", parent.display()))
    })?;
    tracing::debug!(dir = %parent.display(), "created config directory");
    Ok(())
}
