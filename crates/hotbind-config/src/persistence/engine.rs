use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use hotbind_common::ConfigError;
use hotbind_platform::{AesGcmCipher, Cipher};
use tracing::{debug, info};

use super::atomic::write_atomic;
use super::retry::RetryPolicy;
use crate::codec::{self, Codec, CodecRegistry};
use crate::descriptor::Descriptor;
use crate::header;
use crate::settings::Settings;

/// Outcome of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub model: T,
    /// The file was missing or blank and `model` is `T::default()`. The
    /// caller is expected to persist the default once.
    pub is_new: bool,
}

/// Reads and writes one descriptor's file through a codec and a cipher.
#[derive(Clone)]
pub struct PersistenceEngine {
    codec: Arc<dyn Codec>,
    cipher: Arc<dyn Cipher>,
    retry: RetryPolicy,
}

fn default_cipher() -> Arc<dyn Cipher> {
    static CIPHER: OnceLock<Arc<dyn Cipher>> = OnceLock::new();
    CIPHER
        .get_or_init(|| Arc::new(AesGcmCipher::new()))
        .clone()
}

impl PersistenceEngine {
    pub fn new(codec: Arc<dyn Codec>, cipher: Arc<dyn Cipher>) -> Self {
        Self {
            codec,
            cipher,
            retry: RetryPolicy::default(),
        }
    }

    /// Engine for `descriptor`: the globally registered codec for its format
    /// and its own cipher, or the default AES-GCM cipher.
    pub fn for_descriptor(descriptor: &Descriptor) -> Result<Self, ConfigError> {
        let codec = CodecRegistry::global().get(descriptor.format())?;
        let cipher = descriptor.cipher().cloned().unwrap_or_else(default_cipher);
        Ok(Self::new(codec, cipher))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Load the descriptor's file.
    ///
    /// A missing or blank file yields `T::default()` with `is_new` set.
    /// Decode failures are returned as-is so the caller decides whether the
    /// file is corrupt.
    pub fn load<T: Settings>(&self, descriptor: &Descriptor) -> Result<Loaded<T>, ConfigError> {
        let path = descriptor.resolve()?;

        let Some(text) = self.read_shared(path)? else {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Loaded {
                model: T::default(),
                is_new: true,
            });
        };
        if text.trim().is_empty() {
            debug!(path = %path.display(), "blank config file, using defaults");
            return Ok(Loaded {
                model: T::default(),
                is_new: true,
            });
        }

        let plain = if descriptor.is_encrypted() {
            self.cipher.decrypt(&text, descriptor.require_secret()?)?
        } else {
            text
        };

        let model = codec::from_text(self.codec.as_ref(), &plain)?;
        info!(path = %path.display(), "loaded config");
        Ok(Loaded {
            model,
            is_new: false,
        })
    }

    /// Save `model` to the descriptor's file, or to `override_path`.
    pub fn save<T: Settings>(
        &self,
        model: &T,
        descriptor: &Descriptor,
        override_path: Option<&Path>,
    ) -> Result<(), ConfigError> {
        let path = match override_path {
            Some(path) => {
                hotbind_platform::ensure_parent_dir(path)?;
                path
            }
            None => descriptor.resolve()?,
        };

        let mut text = codec::to_text(self.codec.as_ref(), model)?;

        if descriptor.is_encrypted() {
            text = self.cipher.encrypt(&text, descriptor.require_secret()?)?;
        } else if let Some(header) = header::header_for::<T>(descriptor.format()) {
            text = header::inject(&header, &text, descriptor.format());
        }

        write_atomic(path, text.as_bytes())?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Read the whole file, or `None` if it does not exist.
    fn read_shared(&self, path: &Path) -> Result<Option<String>, ConfigError> {
        let read = self.retry.run(path, || match File::open(path) {
            Ok(mut file) => {
                let mut text = String::new();
                file.read_to_string(&mut text)?;
                Ok(Some(text))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        })?;
        Ok(read)
    }
}
