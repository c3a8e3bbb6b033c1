use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::example::ExampleOrRef;
use super::media_type::MediaType;
use super::schema::Schema;

/// A response or encoding header.
///
/// Swagger 2.0 headers describe their type inline (`type`, `items`, ...);
/// those fields land in `extensions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleOrRef>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A reference or inline header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Header(Header),
}
