use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {} still locked after {attempts} attempts", path.display())]
    Locked { path: PathBuf, attempts: u32 },

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config serialize error: {0}")]
    SerializeError(String),

    #[error("no codec registered for format '{0}'")]
    UnsupportedFormat(String),

    #[error("{type_name} was saved before it was bound to a file")]
    Unbound { type_name: &'static str },

    #[error("config watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ConfigError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("path error: {0}")]
    PathError(String),

    #[error("crypto error: {0}")]
    CryptoError(String),
}

/// Top-level error for binaries built on the config crates.
#[derive(Debug, thiserror::Error)]
pub enum HotbindError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
