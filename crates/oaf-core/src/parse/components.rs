use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::example::ExampleOrRef;
use super::header::HeaderOrRef;
use super::link::LinkOrRef;
use super::operation::{CallbackOrRef, PathItem};
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::Schema;
use super::security::SecuritySchemeOrRef;

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleOrRef>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderOrRef>,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecuritySchemeOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, LinkOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackOrRef>,

    #[serde(rename = "pathItems", default, skip_serializing_if = "IndexMap::is_empty")]
    pub path_items: IndexMap<String, PathItem>,

    /// `x-` vendor fields on the container itself.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Components {
    /// True when every category is empty and no vendor field is present.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
            && self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_components() {
        assert!(Components::default().is_empty());
    }

    #[test]
    fn test_vendor_field_keeps_components() {
        let c: Components = serde_json::from_value(json!({"x-owner": "platform"})).unwrap();
        assert!(!c.is_empty());
    }
}
