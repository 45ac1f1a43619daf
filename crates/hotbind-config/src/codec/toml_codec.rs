use hotbind_common::ConfigError;
use serde_json::Value;

use super::Codec;
use crate::format::Format;

/// TOML. `null` has no TOML spelling, so null fields are omitted on encode
/// and come back through `#[serde(default)]` or `Option` on decode. A null
/// array element cannot be omitted without shifting the others, so it is an
/// encode error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn encode(&self, tree: &Value) -> Result<String, ConfigError> {
        if !tree.is_object() {
            return Err(ConfigError::SerializeError(
                "TOML documents must be tables at the top level".into(),
            ));
        }
        toml::to_string_pretty(&strip_nulls(tree)?)
            .map_err(|e| ConfigError::SerializeError(format!("failed to encode TOML: {e}")))
    }

    fn decode(&self, text: &str) -> Result<Value, ConfigError> {
        toml::from_str(text)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
    }
}

fn strip_nulls(tree: &Value) -> Result<Value, ConfigError> {
    match tree {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| Ok((k.clone(), strip_nulls(v)?)))
            .collect::<Result<_, _>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => Err(ConfigError::SerializeError(
                    "TOML arrays cannot hold null elements".into(),
                )),
                v => strip_nulls(v),
            })
            .collect::<Result<_, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_nulls_recurses_into_tables() {
        let tree = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null, "g": 2}]});
        assert_eq!(
            strip_nulls(&tree).unwrap(),
            json!({"b": {"d": 1}, "e": [{"g": 2}]})
        );
    }

    #[test]
    fn null_array_element_is_an_encode_error() {
        let tree = json!({"slots": [null, 2, null, 4]});
        let err = TomlCodec.encode(&tree).unwrap_err();
        assert!(matches!(err, ConfigError::SerializeError(_)), "got {err:?}");
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        assert!(TomlCodec.encode(&json!(5)).is_err());
    }
}
