use hotbind_common::ConfigError;
use serde_json::Value;

use super::Codec;
use crate::format::Format;

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn encode(&self, tree: &Value) -> Result<String, ConfigError> {
        serde_yaml::to_string(tree)
            .map_err(|e| ConfigError::SerializeError(format!("failed to encode YAML: {e}")))
    }

    fn decode(&self, text: &str) -> Result<Value, ConfigError> {
        serde_yaml::from_str(text)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse YAML: {e}")))
    }
}
