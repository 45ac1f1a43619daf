//! OS notification strategy.

use std::sync::Arc;

use hotbind_common::ConfigError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error};

use super::gate::ReloadGate;

/// Subscribe to changes of the gate's file.
///
/// The containing directory is watched non-recursively so atomic replaces
/// (temp file renamed over the target) are seen; events for other names in
/// the directory are dropped.
pub(crate) fn watch(gate: Arc<ReloadGate>) -> Result<RecommendedWatcher, ConfigError> {
    let path = gate.path().to_path_buf();
    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| ConfigError::WatchError(format!("{} has no parent", path.display())))?;
    let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();

    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| match result {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let is_our_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| n == file_name));
                if is_our_file {
                    debug!(kind = ?event.kind, "config file event");
                    gate.reload();
                }
            }
            Err(e) => {
                error!("file watcher error: {e}");
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| ConfigError::WatchError(format!("failed to create watcher: {e}")))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| ConfigError::WatchError(format!("failed to watch {}: {e}", dir.display())))?;

    Ok(watcher)
}
