//! Shared error taxonomy for the hotbind crates.

pub mod errors;

pub use errors::{ConfigError, HotbindError, PlatformError};

pub type Result<T> = std::result::Result<T, HotbindError>;
