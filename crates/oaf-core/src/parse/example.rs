use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named example value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(rename = "externalValue", skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A reference or inline example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Example(Example),
}
