//! Binding descriptors and path resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use hotbind_common::{ConfigError, PlatformError};
use hotbind_platform::{canonical_path, ensure_parent_dir, user_config_dir, Cipher};
use tracing::debug;

use crate::format::Format;

/// Self-write suppression window applied around every save.
pub const DEFAULT_SUPPRESS_WINDOW: Duration = Duration::from_millis(800);

/// Period of the polling watcher.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How a binding notices external edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadMode {
    /// OS file notifications; falls back to polling if unavailable.
    #[default]
    EventDriven,
    /// Periodic modification-time checks.
    Polling,
    /// No watching at all.
    Off,
}

/// Names a config file and how it is stored.
///
/// The canonical path is computed on the first [`Descriptor::resolve`] and
/// memoized for the lifetime of this value. Builder methods that change
/// where the file lives discard the memoized path.
#[derive(Clone)]
pub struct Descriptor {
    name: String,
    format: Format,
    directory: PathBuf,
    encrypted: bool,
    secret: Option<String>,
    reload: ReloadMode,
    suppress_window: Duration,
    poll_interval: Duration,
    cipher: Option<Arc<dyn Cipher>>,
    resolved: OnceLock<PathBuf>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        Self {
            name: name.into(),
            format,
            directory: PathBuf::from(hotbind_platform::DEFAULT_CONFIG_DIR),
            encrypted: false,
            secret: None,
            reload: ReloadMode::default(),
            suppress_window: DEFAULT_SUPPRESS_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cipher: None,
            resolved: OnceLock::new(),
        }
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self.resolved = OnceLock::new();
        self
    }

    /// Place the file in the per-user config directory for `app`.
    pub fn in_user_config_dir(self, app: &str) -> Result<Self, ConfigError> {
        let dir = user_config_dir(app)?;
        Ok(self.directory(dir))
    }

    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn reload(mut self, mode: ReloadMode) -> Self {
        self.reload = mode;
        self
    }

    pub fn suppress_window(mut self, window: Duration) -> Self {
        self.suppress_window = window;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Use `cipher` instead of the default [`hotbind_platform::AesGcmCipher`].
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn reload_mode(&self) -> ReloadMode {
        self.reload
    }

    pub fn suppress_window_duration(&self) -> Duration {
        self.suppress_window
    }

    pub fn poll_interval_duration(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn cipher(&self) -> Option<&Arc<dyn Cipher>> {
        self.cipher.as_ref()
    }

    /// Secret for an encrypted descriptor.
    pub(crate) fn require_secret(&self) -> Result<&str, ConfigError> {
        self.secret.as_deref().ok_or_else(|| {
            ConfigError::Platform(PlatformError::CryptoError(format!(
                "descriptor '{}' is encrypted but has no secret",
                self.name
            )))
        })
    }

    /// Canonical absolute path of the file.
    ///
    /// The first call computes the path and creates the containing
    /// directory; later calls return the memoized value without touching
    /// the filesystem.
    pub fn resolve(&self) -> Result<&Path, ConfigError> {
        if let Some(path) = self.resolved.get() {
            return Ok(path);
        }

        let path = canonical_path(&self.name, self.format.extension(), &self.directory)?;
        ensure_parent_dir(&path)?;
        debug!(path = %path.display(), "resolved config path");

        // A concurrent first call may have won; both computed the same path.
        Ok(self.resolved.get_or_init(|| path))
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("directory", &self.directory)
            .field("encrypted", &self.encrypted)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("reload", &self.reload)
            .field("suppress_window", &self.suppress_window)
            .field("poll_interval", &self.poll_interval)
            .field("custom_cipher", &self.cipher.is_some())
            .field("resolved", &self.resolved.get())
            .finish()
    }
}
