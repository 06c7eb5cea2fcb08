//! Raw input decoding.
//!
//! Action inputs arrive as text in one of two formats. Decoders are tried in
//! order (JSON, then YAML) and the first one that succeeds wins.

use crate::{ConfigError, ConfigResult};
use serde_json::{Map, Value};

/// Format an input was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

type Decoder = fn(&str) -> Option<Value>;

const DECODERS: &[(Format, Decoder)] = &[
    (Format::Json, decode_json as Decoder),
    (Format::Yaml, decode_yaml as Decoder),
];

fn decode_json(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

fn decode_yaml(raw: &str) -> Option<Value> {
    serde_yaml_ng::from_str(raw).ok()
}

/// Decode raw text with the first decoder that accepts it.
pub fn decode(raw: &str) -> Option<(Format, Value)> {
    DECODERS
        .iter()
        .find_map(|(format, decoder)| decoder(raw).map(|value| (*format, value)))
}

/// A decoded key/value configuration object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub format: Format,
    entries: Map<String, Value>,
}

impl Document {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value under `key`, treating an explicit null as absent.
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }
}

/// Parse raw text into a configuration object.
pub fn parse_document(raw: &str) -> ConfigResult<Document> {
    if raw.trim().is_empty() {
        return Err(ConfigError::NotAnObject {
            found: describe(None),
        });
    }

    let (format, value) = decode(raw).ok_or_else(|| ConfigError::Unparseable {
        content: raw.to_string(),
    })?;

    match value {
        Value::Object(entries) => Ok(Document { format, entries }),
        other => Err(ConfigError::NotAnObject {
            found: describe(Some(&other)),
        }),
    }
}

/// Render a (possibly missing) value for error messages.
pub(crate) fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let doc = parse_document(r#"{"app": "myApp", "valueFiles": ["a.yaml"]}"#).unwrap();
        assert_eq!(doc.format, Format::Json);
        assert_eq!(doc.get("app"), Some(&Value::String("myApp".to_string())));
    }

    #[test]
    fn test_parse_yaml_fallback() {
        let doc = parse_document("token: myToken\nchannel: \"#mychannel\"").unwrap();
        assert_eq!(doc.format, Format::Yaml);
        assert_eq!(
            doc.get("channel"),
            Some(&Value::String("#mychannel".to_string()))
        );
    }

    #[test]
    fn test_unparseable_echoes_content() {
        let err = parse_document("@$%^failconfig").unwrap_err();
        assert!(matches!(err, ConfigError::Unparseable { .. }));
        assert_eq!(
            err.to_string(),
            "Unable to parse config. Found content: @$%^failconfig"
        );
    }

    #[test]
    fn test_empty_input_is_not_an_object() {
        let err = parse_document("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to load config \"undefined\" into an object."
        );
    }

    #[test]
    fn test_scalar_is_not_an_object() {
        let err = parse_document("42").unwrap_err();
        assert_eq!(err.to_string(), "Unable to load config \"42\" into an object.");

        let err = parse_document("- a\n- b").unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject { .. }));
    }

    #[test]
    fn test_present_ignores_null() {
        let doc = parse_document(r#"{"namespace": null}"#).unwrap();
        assert!(doc.get("namespace").is_some());
        assert!(doc.present("namespace").is_none());
    }
}
