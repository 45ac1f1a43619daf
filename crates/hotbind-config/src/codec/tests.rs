//! Tests for the codec registry and the built-in codecs.

use super::*;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Listener {
    host: String,
    port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    name: String,
    enabled: bool,
    ratio: f64,
    #[serde(default)]
    nickname: Option<String>,
    tags: Vec<String>,
    listener: Listener,
}

fn sample() -> Sample {
    Sample {
        name: "edge".into(),
        enabled: true,
        ratio: 0.25,
        nickname: None,
        tags: vec!["a".into(), "b".into()],
        listener: Listener {
            host: "127.0.0.1".into(),
            port: 9090,
        },
    }
}

#[test]
fn builtin_codecs_round_trip() {
    let registry = CodecRegistry::with_builtins();
    for format in [Format::Json, Format::Toml, Format::Yaml] {
        let codec = registry.get(format).unwrap();
        let text = to_text(codec.as_ref(), &sample()).unwrap();
        let back: Sample = from_text(codec.as_ref(), &text).unwrap();
        assert_eq!(back, sample(), "round trip through {format}");
    }
}

#[test]
fn toml_omits_none_fields() {
    let text = to_text(&TomlCodec, &sample()).unwrap();
    assert!(!text.contains("nickname"));
    assert!(text.contains("[listener]"));
}

#[test]
fn toml_keeps_some_fields() {
    let mut value = sample();
    value.nickname = Some("e".into());
    let text = to_text(&TomlCodec, &value).unwrap();
    let back: Sample = from_text(&TomlCodec, &text).unwrap();
    assert_eq!(back.nickname.as_deref(), Some("e"));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Slots {
    slots: Vec<Option<u8>>,
}

#[test]
fn toml_refuses_to_drop_array_holes() {
    let value = Slots {
        slots: vec![None, Some(2), None, Some(4)],
    };
    let err = to_text(&TomlCodec, &value).unwrap_err();
    assert!(matches!(err, ConfigError::SerializeError(_)), "got {err:?}");

    for format in [Format::Json, Format::Yaml] {
        let codec = CodecRegistry::with_builtins().get(format).unwrap();
        let text = to_text(codec.as_ref(), &value).unwrap();
        let back: Slots = from_text(codec.as_ref(), &text).unwrap();
        assert_eq!(back, value, "holes survive {format}");
    }
}

#[test]
fn keys_keep_declaration_order() {
    let registry = CodecRegistry::with_builtins();
    for format in [Format::Json, Format::Toml, Format::Yaml] {
        let codec = registry.get(format).unwrap();
        let text = to_text(codec.as_ref(), &sample()).unwrap();
        let name = text.find("name").unwrap();
        let enabled = text.find("enabled").unwrap();
        let ratio = text.find("ratio").unwrap();
        assert!(name < enabled && enabled < ratio, "{format}: {text}");
    }
}

#[test]
fn ini_and_xml_have_no_builtin_codec() {
    let registry = CodecRegistry::with_builtins();
    assert!(matches!(
        registry.get(Format::Ini),
        Err(ConfigError::UnsupportedFormat(f)) if f == "ini"
    ));
    assert!(registry.get(Format::Xml).is_err());
}

#[test]
fn register_replaces_codec_for_format() {
    struct Upper;
    impl Codec for Upper {
        fn format(&self) -> Format {
            Format::Ini
        }
        fn encode(&self, tree: &Value) -> Result<String, ConfigError> {
            Ok(tree.to_string().to_uppercase())
        }
        fn decode(&self, text: &str) -> Result<Value, ConfigError> {
            serde_json::from_str(&text.to_lowercase())
                .map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }

    let registry = CodecRegistry::new();
    registry.register(Arc::new(Upper));
    let codec = registry.get(Format::Ini).unwrap();
    assert_eq!(codec.encode(&serde_json::json!({"a": 1})).unwrap(), "{\"A\":1}");
}

#[test]
fn malformed_text_is_a_parse_error() {
    let codecs: [Arc<dyn Codec>; 3] = [
        Arc::new(JsonCodec),
        Arc::new(TomlCodec),
        Arc::new(YamlCodec),
    ];
    for codec in codecs {
        let err = from_text::<Sample>(codec.as_ref(), "{{ not: [valid").unwrap_err();
        assert!(
            matches!(err, ConfigError::ParseError(_)),
            "{} gave {err:?}",
            codec.format()
        );
    }
}

#[test]
fn shape_mismatch_is_a_parse_error() {
    let err = from_text::<Sample>(&JsonCodec, "{\"name\": 5}").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn json_accepts_comment_header() {
    let body = to_text(&JsonCodec, &sample()).unwrap();
    let text = format!("// Sample\n// name: display name\n\n{body}");
    let back: Sample = from_text(&JsonCodec, &text).unwrap();
    assert_eq!(back, sample());
}
