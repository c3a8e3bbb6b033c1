use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::example::ExampleOrRef;
use super::media_type::MediaType;
use super::schema::Schema;

/// Parameter location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    /// Swagger 2.0 request payload.
    Body,
    /// Swagger 2.0 form field.
    FormData,
    /// OpenAPI 3.2 whole query string.
    Querystring,
}

/// An API parameter.
///
/// Swagger 2.0 body parameters carry `schema`; OpenAPI 3.x parameters carry
/// either `schema` or `content`. Legacy non-body fields (`type`, `items`, ...)
/// are kept in `extensions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleOrRef>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A reference or inline parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        /// `summary`, `description` and any other field written beside `$ref`.
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Parameter(Parameter),
}
