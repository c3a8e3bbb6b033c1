use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::operation::PathItem;
use super::parameter::Parameter;
use super::response::Response;
use super::schema::Schema;
use super::security::{SecurityRequirement, SecurityScheme};

/// Info object describing the API. Contact, license and other metadata
/// fields pass through `extensions` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Top-level OpenAPI 3.x document (the modern, components-namespaced variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(rename = "jsonSchemaDialect", skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    /// OpenAPI 3.1+.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub webhooks: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Top-level Swagger 2.0 document (the legacy, flat-namespaced variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerSpec {
    pub swagger: String,

    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SecurityScheme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Which of the two document shapes a [`Document`] has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Swagger 2.0: `definitions`, `parameters`, `responses`,
    /// `securityDefinitions` at the top level.
    Legacy,
    /// OpenAPI 3.x: everything reusable under `components`.
    Modern,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Legacy => write!(f, "swagger 2.0"),
            Variant::Modern => write!(f, "openapi 3.x"),
        }
    }
}

/// A parsed API description of either variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Legacy(SwaggerSpec),
    Modern(OpenApiSpec),
}

impl Document {
    pub fn variant(&self) -> Variant {
        match self {
            Document::Legacy(_) => Variant::Legacy,
            Document::Modern(_) => Variant::Modern,
        }
    }

    /// The declared `swagger` / `openapi` version string.
    pub fn version(&self) -> &str {
        match self {
            Document::Legacy(spec) => &spec.swagger,
            Document::Modern(spec) => &spec.openapi,
        }
    }

    pub fn info(&self) -> &Info {
        match self {
            Document::Legacy(spec) => &spec.info,
            Document::Modern(spec) => &spec.info,
        }
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        match self {
            Document::Legacy(spec) => &spec.paths,
            Document::Modern(spec) => &spec.paths,
        }
    }

    pub fn paths_mut(&mut self) -> &mut IndexMap<String, PathItem> {
        match self {
            Document::Legacy(spec) => &mut spec.paths,
            Document::Modern(spec) => &mut spec.paths,
        }
    }

    /// Named schema definitions, if the document has a place for them.
    pub fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Document::Legacy(spec) => Some(&spec.definitions),
            Document::Modern(spec) => spec.components.as_ref().map(|c| &c.schemas),
        }
    }

    pub fn schemas_mut(&mut self) -> Option<&mut IndexMap<String, Schema>> {
        match self {
            Document::Legacy(spec) => Some(&mut spec.definitions),
            Document::Modern(spec) => spec.components.as_mut().map(|c| &mut c.schemas),
        }
    }

    /// Textual location of the schema collection, e.g. `components.schemas`.
    pub fn schemas_location(&self) -> &'static str {
        match self {
            Document::Legacy(_) => "definitions",
            Document::Modern(_) => "components.schemas",
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
