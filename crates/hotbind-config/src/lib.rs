//! Typed configuration files with hot reload and atomic persistence.
//!
//! A settings type is bound to a file through a [`Descriptor`]. Loading goes
//! through the [`PersistenceEngine`] (read, decrypt, decode); saving goes the
//! other way and replaces the file with an atomic rename. A [`ChangeWatcher`]
//! picks up external edits and feeds them back into the binding, while the
//! binding's own saves are suppressed so they never echo back as reloads.
//!
//! Two binding strategies exist and are deliberately separate APIs:
//!
//! - [`Singleton`] hands out `Arc<T>` snapshots and swaps in a brand new
//!   value on every reload.
//! - [`Shared`] hands out one `Arc<RwLock<T>>` for the life of the process
//!   and copies reloaded values into it in place.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hotbind_config::{ConfigFile, Descriptor, Format, Settings, Singleton};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Server {
//!     port: u16,
//! }
//!
//! impl Default for Server {
//!     fn default() -> Self {
//!         Self { port: 8080 }
//!     }
//! }
//!
//! impl Settings for Server {}
//!
//! impl ConfigFile for Server {
//!     fn descriptor() -> Descriptor {
//!         Descriptor::new("server", Format::Toml)
//!     }
//! }
//!
//! let server = Singleton::<Server>::get().expect("failed to load server config");
//! println!("listening on {}", server.port);
//! ```

pub mod binding;
pub mod codec;
pub mod descriptor;
pub mod format;
pub mod header;
pub mod persistence;
pub mod settings;
pub mod watcher;

// Re-export core types for convenience
pub use binding::{Shared, SharedRef, Singleton};
pub use codec::{Codec, CodecRegistry};
pub use descriptor::{Descriptor, ReloadMode, DEFAULT_POLL_INTERVAL, DEFAULT_SUPPRESS_WINDOW};
pub use format::{CommentStyle, Format};
pub use hotbind_common::ConfigError;
pub use hotbind_platform::{AesGcmCipher, Cipher, DEFAULT_CONFIG_DIR};
pub use persistence::{Loaded, PersistenceEngine, RetryPolicy};
pub use settings::{ConfigFile, FieldDoc, Settings};
pub use watcher::{ChangeWatcher, WatcherState};
