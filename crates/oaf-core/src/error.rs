use thiserror::Error;

use crate::parse::spec::Variant;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported API description version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Misuse of the fixer, reported before any traversal starts.
///
/// Structural problems inside a document are never errors; they are
/// skipped and the pass carries on.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("cannot determine document variant: {variant} document declares version '{version}'")]
    IndeterminateVariant { variant: Variant, version: String },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("conflicting modes: both an output path ({0}) and in-place rewriting were requested")]
    ConflictingModes(String),
}
