use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::security::SecurityRequirement;

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    /// Status-code keyed, including `default`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A path item, containing operations keyed by HTTP method.
///
/// OpenAPI 3.1 allows a path item to be a `$ref` to
/// `#/components/pathItems/...`; like [`Schema`](super::schema::Schema) the
/// pointer lives on the node itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// OpenAPI 3.2 `QUERY` method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Operation>,

    /// OpenAPI 3.2 custom methods, keyed by method name.
    #[serde(
        rename = "additionalOperations",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub additional_operations: IndexMap<String, Operation>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    /// All operations with their method name, standard methods first.
    pub fn operations(&self) -> Vec<(String, &Operation)> {
        let standard = [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
            ("query", &self.query),
        ];
        let mut ops: Vec<(String, &Operation)> = standard
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method.to_string(), op)))
            .collect();
        for (method, op) in &self.additional_operations {
            ops.push((format!("additionalOperations.{method}"), op));
        }
        ops
    }

    /// Mutable counterpart of [`PathItem::operations`], same order.
    pub fn operations_mut(&mut self) -> Vec<(String, &mut Operation)> {
        let standard = [
            ("get", &mut self.get),
            ("put", &mut self.put),
            ("post", &mut self.post),
            ("delete", &mut self.delete),
            ("options", &mut self.options),
            ("head", &mut self.head),
            ("patch", &mut self.patch),
            ("trace", &mut self.trace),
            ("query", &mut self.query),
        ];
        let mut ops: Vec<(String, &mut Operation)> = standard
            .into_iter()
            .filter_map(|(method, op)| op.as_mut().map(|op| (method.to_string(), op)))
            .collect();
        for (method, op) in &mut self.additional_operations {
            ops.push((format!("additionalOperations.{method}"), op));
        }
        ops
    }

    /// A path item with no operations and no `$ref` contributes nothing.
    pub fn is_empty(&self) -> bool {
        self.ref_path.is_none() && self.operations().is_empty()
    }
}

/// A callback: runtime expression → path item.
pub type Callback = IndexMap<String, PathItem>;

/// A reference or inline callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallbackOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Callback(Callback),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operations_include_custom_methods() {
        let item: PathItem = serde_json::from_value(json!({
            "get": {"responses": {}},
            "query": {"responses": {}},
            "additionalOperations": {"LINK": {"responses": {}}}
        }))
        .unwrap();
        let methods: Vec<String> = item.operations().into_iter().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["get", "query", "additionalOperations.LINK"]);
    }

    #[test]
    fn test_empty_path_item() {
        let empty: PathItem = serde_json::from_value(json!({"summary": "nothing"})).unwrap();
        assert!(empty.is_empty());

        let referenced: PathItem =
            serde_json::from_value(json!({"$ref": "#/components/pathItems/Shared"})).unwrap();
        assert!(!referenced.is_empty());
    }

    #[test]
    fn test_callback_ref() {
        let cb: CallbackOrRef =
            serde_json::from_value(json!({"$ref": "#/components/callbacks/OnEvent"})).unwrap();
        assert!(matches!(cb, CallbackOrRef::Ref { .. }));

        let cb: CallbackOrRef = serde_json::from_value(json!({
            "{$request.body#/url}": {"post": {"responses": {}}}
        }))
        .unwrap();
        match cb {
            CallbackOrRef::Callback(map) => assert!(map.contains_key("{$request.body#/url}")),
            _ => panic!("expected inline callback"),
        }
    }
}
