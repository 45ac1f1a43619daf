use hotbind_common::ConfigError;
use serde_json::Value;

use super::Codec;
use crate::format::Format;

/// Pretty-printed JSON. Leading `//` comment lines are skipped on decode so
/// generated headers do not break parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, tree: &Value) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(tree)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ConfigError::SerializeError(format!("failed to encode JSON: {e}")))
    }

    fn decode(&self, text: &str) -> Result<Value, ConfigError> {
        serde_json::from_str(skip_comment_header(text))
            .map_err(|e| ConfigError::ParseError(format!("failed to parse JSON: {e}")))
    }
}

fn skip_comment_header(mut text: &str) -> &str {
    loop {
        let trimmed = text.trim_start();
        match trimmed.strip_prefix("//") {
            Some(comment) => text = comment.split_once('\n').map_or("", |(_, rest)| rest),
            None => return trimmed,
        }
    }
}
