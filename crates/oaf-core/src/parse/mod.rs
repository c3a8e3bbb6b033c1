pub mod components;
pub mod example;
pub mod header;
pub mod link;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod spec;

use serde_json::Value;

use crate::error::ParseError;
use spec::{Document, Variant};

/// Parse a document of either variant from YAML.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Parse a document of either variant from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

/// Parse by file extension: `json` is read as JSON, anything else as YAML.
pub fn from_str_detect(input: &str, extension: Option<&str>) -> Result<Document, ParseError> {
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("json") => from_json(input),
        _ => from_yaml(input),
    }
}

/// Build a typed document from an already-parsed tree.
pub fn from_value(mut value: Value) -> Result<Document, ParseError> {
    let variant = detect_variant(&value)?;
    for key in ["openapi", "swagger"] {
        if let Some(version) = value.get_mut(key)
            && !version.is_string()
        {
            *version = Value::String(version_string(version));
        }
    }
    let doc = match variant {
        Variant::Legacy => Document::Legacy(serde_json::from_value(value)?),
        Variant::Modern => Document::Modern(serde_json::from_value(value)?),
    };
    Ok(doc)
}

/// Decide the variant from the `swagger` / `openapi` version field.
pub fn detect_variant(value: &Value) -> Result<Variant, ParseError> {
    if let Some(version) = value.get("openapi") {
        let version = version_string(version);
        return if version.starts_with("3.") {
            Ok(Variant::Modern)
        } else {
            Err(ParseError::UnsupportedVersion(version))
        };
    }
    if let Some(version) = value.get("swagger") {
        let version = version_string(version);
        return if version.starts_with("2.") {
            Ok(Variant::Legacy)
        } else {
            Err(ParseError::UnsupportedVersion(version))
        };
    }
    Err(ParseError::MissingField("openapi or swagger".to_string()))
}

// YAML authors often write `swagger: 2.0` unquoted, which parses as a float.
fn version_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
