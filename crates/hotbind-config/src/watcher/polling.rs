//! Timer strategy: compare modification times on a fixed period.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use hotbind_common::ConfigError;

use super::gate::ReloadGate;

pub(crate) struct Poller {
    gate: Arc<ReloadGate>,
}

impl Poller {
    pub(crate) fn new(gate: Arc<ReloadGate>) -> Self {
        Self { gate }
    }

    /// One timer tick: reload if the modification time moved.
    pub(crate) fn tick(&self) {
        if self.gate.changed_since_baseline() {
            self.gate.reload();
        }
    }
}

/// Owns the polling thread; dropping it stops the thread.
pub(crate) struct PollHandle {
    _stop: mpsc::Sender<()>,
}

pub(crate) fn spawn(gate: Arc<ReloadGate>, interval: Duration) -> Result<PollHandle, ConfigError> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let poller = Poller::new(gate);

    std::thread::Builder::new()
        .name("hotbind-poll".into())
        .spawn(move || loop {
            // Ticks run one at a time on this thread and the wait restarts
            // after each one, so a slow reload drops the ticks it overlapped.
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => poller.tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("failed to start poll thread: {e}")))?;

    Ok(PollHandle { _stop: stop_tx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_gate(path: std::path::PathBuf) -> (Arc<ReloadGate>, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let gate = ReloadGate::new(
            path,
            Duration::ZERO,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (Arc::new(gate), hits)
    }

    #[test]
    fn tick_reloads_when_file_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        let (gate, hits) = counting_gate(path.clone());
        let poller = Poller::new(gate);

        poller.tick();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        std::fs::write(&path, "{}").unwrap();
        poller.tick();
        poller.tick();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn slow_reload_does_not_queue_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, "{}").unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let gate = ReloadGate::new(
            path.clone(),
            Duration::ZERO,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
            }),
        );
        let handle = spawn(Arc::new(gate), Duration::from_millis(10)).unwrap();

        std::thread::sleep(Duration::from_millis(600));
        assert_eq!(hits.load(Ordering::SeqCst), 1, "one change, one reload");
        drop(handle);
    }
}
