use std::path::{Path, PathBuf};

use hotbind_common::PlatformError;

/// Directory used when a descriptor does not name one.
pub const DEFAULT_CONFIG_DIR: &str = "./config";

/// Build the absolute path of a config file.
///
/// `name` is used verbatim when it already carries an extension; otherwise
/// `extension` is appended. The result is joined onto `directory` and made
/// absolute against the current working directory. Nothing is created.
pub fn canonical_path(
    name: &str,
    extension: &str,
    directory: &Path,
) -> Result<PathBuf, PlatformError> {
    if name.trim().is_empty() {
        return Err(PlatformError::PathError("config name is empty".into()));
    }

    let file_name = if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    };

    std::path::absolute(directory.join(file_name))
        .map_err(|e| PlatformError::PathError(e.to_string()))
}

/// Returns the platform-specific configuration directory for `app`.
///
/// - macOS: `~/Library/Application Support/<app>`
/// - Linux: `$XDG_CONFIG_HOME/<app>` (defaults to `~/.config/<app>`)
/// - Windows: `%APPDATA%\<app>`
pub fn user_config_dir(app: &str) -> Result<PathBuf, PlatformError> {
    dirs::config_dir()
        .map(|p| p.join(app))
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))
}
