//! File change watching with self-write suppression.
//!
//! Two strategies share one [`gate::ReloadGate`]: OS notifications through
//! the `notify` crate, or a polling thread comparing modification times.
//! Both end in the same check: ignore events inside the suppression window,
//! ignore missing files, and fire the callback once per strictly newer
//! modification time.

mod change_watcher;
mod event;
mod gate;
mod polling;


pub use change_watcher::{ChangeWatcher, WatcherState};
