//! Format codecs.
//!
//! A [`Codec`] turns a `serde_json::Value` tree into text and back. Typed
//! models go through [`to_text`] / [`from_text`], so codecs stay object safe
//! and can be looked up by [`Format`] at runtime. Adding a format means
//! registering a new codec, never touching the persistence engine.

mod json_codec;
mod toml_codec;
mod yaml_codec;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use hotbind_common::ConfigError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::format::Format;

pub use json_codec::JsonCodec;
pub use toml_codec::TomlCodec;
pub use yaml_codec::YamlCodec;

/// Converts between a value tree and the text of one format.
pub trait Codec: Send + Sync {
    fn format(&self) -> Format;
    fn encode(&self, tree: &Value) -> Result<String, ConfigError>;
    fn decode(&self, text: &str) -> Result<Value, ConfigError>;
}

/// Serialize `model` with `codec`.
pub fn to_text<T: Serialize>(codec: &dyn Codec, model: &T) -> Result<String, ConfigError> {
    let tree = serde_json::to_value(model)
        .map_err(|e| ConfigError::SerializeError(format!("failed to serialize model: {e}")))?;
    codec.encode(&tree)
}

/// Deserialize a `T` from `text` with `codec`.
pub fn from_text<T: DeserializeOwned>(codec: &dyn Codec, text: &str) -> Result<T, ConfigError> {
    let tree = codec.decode(text)?;
    serde_json::from_value(tree).map_err(|e| {
        ConfigError::ParseError(format!("{} does not match the model: {e}", codec.format()))
    })
}

/// Codecs keyed by format.
pub struct CodecRegistry {
    codecs: RwLock<HashMap<Format, Arc<dyn Codec>>>,
}

impl CodecRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            codecs: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with the JSON, TOML and YAML codecs installed.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(JsonCodec));
        registry.register(Arc::new(TomlCodec));
        registry.register(Arc::new(YamlCodec));
        registry
    }

    /// Process-wide registry used by [`crate::PersistenceEngine::for_descriptor`].
    pub fn global() -> &'static CodecRegistry {
        static GLOBAL: OnceLock<CodecRegistry> = OnceLock::new();
        GLOBAL.get_or_init(CodecRegistry::with_builtins)
    }

    /// Install `codec` for its format, replacing any previous one.
    pub fn register(&self, codec: Arc<dyn Codec>) {
        self.codecs.write().insert(codec.format(), codec);
    }

    pub fn get(&self, format: Format) -> Result<Arc<dyn Codec>, ConfigError> {
        self.codecs
            .read()
            .get(&format)
            .cloned()
            .ok_or_else(|| ConfigError::UnsupportedFormat(format.to_string()))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
