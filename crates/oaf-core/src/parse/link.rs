use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A design-time link between a response and another operation.
///
/// Links hold no schema nodes; only their own `$ref` matters to the graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "operationRef", skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A reference or inline link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Link(Link),
}
