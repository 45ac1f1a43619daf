//! Debounce and suppression state shared by both watcher strategies.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use tracing::debug;

pub(crate) type ReloadCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct WatchState {
    last_observed: Option<SystemTime>,
    suppress_until: Instant,
}

/// Decides whether a change signal is a genuine external edit.
pub(crate) struct ReloadGate {
    path: PathBuf,
    window: Duration,
    state: Mutex<WatchState>,
    callback: ReloadCallback,
}

impl ReloadGate {
    pub(crate) fn new(path: PathBuf, window: Duration, callback: ReloadCallback) -> Self {
        Self {
            path,
            window,
            state: Mutex::new(WatchState {
                last_observed: None,
                suppress_until: Instant::now(),
            }),
            callback,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Record the file's current modification time as already seen.
    pub(crate) fn prime(&self) {
        if let Some(mtime) = modified(&self.path) {
            self.state.lock().last_observed = Some(mtime);
        }
    }

    /// Called by the writer immediately before a save.
    ///
    /// Pushes the suppression deadline to `now + window`, never backwards,
    /// so the temp-file write and rename land inside it.
    pub(crate) fn mark_file_changed(&self) {
        let until = Instant::now() + self.window;
        let mut state = self.state.lock();
        if until > state.suppress_until {
            state.suppress_until = until;
        }
    }

    /// Called by the writer immediately after a save.
    ///
    /// Moves the baseline to the file's final modification time. The
    /// suppression deadline is left alone, so an external edit after the
    /// original window is still seen.
    pub(crate) fn mark_write_complete(&self) {
        if let Some(mtime) = modified(&self.path) {
            self.state.lock().last_observed = Some(mtime);
        }
    }

    /// True if the file's modification time differs from the baseline.
    pub(crate) fn changed_since_baseline(&self) -> bool {
        let Some(mtime) = modified(&self.path) else {
            return false;
        };
        self.state.lock().last_observed != Some(mtime)
    }

    /// Run the callback if this signal is a genuine change.
    ///
    /// Returns whether the callback ran.
    pub(crate) fn reload(&self) -> bool {
        {
            let mut state = self.state.lock();
            if Instant::now() < state.suppress_until {
                debug!(path = %self.path.display(), "change inside suppression window, ignored");
                return false;
            }
            let Some(mtime) = modified(&self.path) else {
                debug!(path = %self.path.display(), "changed file is gone, ignored");
                return false;
            };
            if state.last_observed.is_some_and(|seen| mtime <= seen) {
                return false;
            }
            state.last_observed = Some(mtime);
        }

        (self.callback)();
        true
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
