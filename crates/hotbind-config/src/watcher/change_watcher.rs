//! Public watcher handle tying a strategy to the reload gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hotbind_common::ConfigError;
use notify::RecommendedWatcher;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::gate::ReloadGate;
use super::{event, polling};
use crate::descriptor::{Descriptor, ReloadMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Stopped,
    Watching,
}

enum Backend {
    Event(RecommendedWatcher),
    Polling(polling::PollHandle),
}

/// Watches one file and invokes a callback once per genuine external change.
pub struct ChangeWatcher {
    gate: Arc<ReloadGate>,
    mode: ReloadMode,
    poll_interval: Duration,
    backend: Mutex<Option<Backend>>,
}

impl ChangeWatcher {
    pub fn new(
        path: PathBuf,
        mode: ReloadMode,
        suppress_window: Duration,
        poll_interval: Duration,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            gate: Arc::new(ReloadGate::new(path, suppress_window, Box::new(callback))),
            mode,
            poll_interval,
            backend: Mutex::new(None),
        }
    }

    /// Watcher configured from a descriptor's reload mode and tunables.
    pub fn for_descriptor(
        descriptor: &Descriptor,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        let path = descriptor.resolve()?.to_path_buf();
        Ok(Self::new(
            path,
            descriptor.reload_mode(),
            descriptor.suppress_window_duration(),
            descriptor.poll_interval_duration(),
            callback,
        ))
    }

    pub fn path(&self) -> &Path {
        self.gate.path()
    }

    /// Begin watching. No-op when already watching or when the mode is
    /// [`ReloadMode::Off`].
    ///
    /// If OS notifications cannot be set up the watcher falls back to
    /// polling instead of failing.
    pub fn start(&self) -> Result<(), ConfigError> {
        let mut backend = self.backend.lock();
        if backend.is_some() {
            return Ok(());
        }

        self.gate.prime();
        let started = match self.mode {
            ReloadMode::Off => return Ok(()),
            ReloadMode::EventDriven => match event::watch(self.gate.clone()) {
                Ok(watcher) => Backend::Event(watcher),
                Err(e) => {
                    warn!(
                        path = %self.gate.path().display(),
                        "file notifications unavailable ({e}), polling instead"
                    );
                    Backend::Polling(polling::spawn(self.gate.clone(), self.poll_interval)?)
                }
            },
            ReloadMode::Polling => {
                Backend::Polling(polling::spawn(self.gate.clone(), self.poll_interval)?)
            }
        };

        let strategy = match started {
            Backend::Event(_) => "events",
            Backend::Polling(_) => "polling",
        };
        info!(path = %self.gate.path().display(), strategy, "config watcher started");
        *backend = Some(started);
        Ok(())
    }

    /// Stop watching and release the OS watch or timer thread.
    ///
    /// A reload already running on the watcher's thread may still finish
    /// after this returns.
    pub fn stop(&self) {
        if self.backend.lock().take().is_some() {
            info!(path = %self.gate.path().display(), "config watcher stopped");
        }
    }

    pub fn state(&self) -> WatcherState {
        if self.backend.lock().is_some() {
            WatcherState::Watching
        } else {
            WatcherState::Stopped
        }
    }

    pub fn is_watching(&self) -> bool {
        self.state() == WatcherState::Watching
    }

    /// Whether the running strategy is polling, including after a fallback.
    pub fn is_polling(&self) -> bool {
        matches!(*self.backend.lock(), Some(Backend::Polling(_)))
    }

    /// Suppress the notifications caused by our own write. Call
    /// immediately before saving; the window covers the temp-file write
    /// and the rename.
    pub fn mark_file_changed(&self) {
        self.gate.mark_file_changed();
    }

    /// Record our own save as seen. Call immediately after saving, whether
    /// or not the save succeeded.
    pub fn mark_write_complete(&self) {
        self.gate.mark_write_complete();
    }

    /// Run the change check now, as a notification would.
    ///
    /// Returns whether the callback ran.
    pub fn check_now(&self) -> bool {
        self.gate.reload()
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
