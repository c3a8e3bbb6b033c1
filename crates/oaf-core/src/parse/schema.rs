use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    /// Swagger 2.0 only, for `formData` uploads.
    File,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A schema slot that may hold a boolean, a nested schema, or a mapping the
/// parser could not promote to a [`Schema`].
///
/// Absence is expressed by wrapping the slot in `Option`. The `Untyped`
/// case is kept so that references inside malformed or tuple-style
/// sub-schemas (`items: [...]`, an unknown `type`, ...) still reach the
/// reference graph instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSlot {
    Bool(bool),
    Schema(Box<Schema>),
    Untyped(Value),
}

impl SchemaSlot {
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaSlot::Schema(s) => Some(s),
            _ => None,
        }
    }

    /// The nested node to walk, `None` for a boolean.
    pub fn child(&self) -> Option<SchemaChild<'_>> {
        match self {
            SchemaSlot::Schema(s) => Some(SchemaChild::Schema(s)),
            SchemaSlot::Untyped(value) => Some(SchemaChild::Untyped(value)),
            SchemaSlot::Bool(_) => None,
        }
    }

    pub fn child_mut(&mut self) -> Option<SchemaChildMut<'_>> {
        match self {
            SchemaSlot::Schema(s) => Some(SchemaChildMut::Schema(s)),
            SchemaSlot::Untyped(value) => Some(SchemaChildMut::Untyped(value)),
            SchemaSlot::Bool(_) => None,
        }
    }
}


/// Discriminator for polymorphic schemas.
///
/// Swagger 2.0 only carries the property name; OpenAPI 3.x adds an explicit
/// `mapping` whose values are either full pointers or bare schema names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    Object {
        #[serde(rename = "propertyName")]
        property_name: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        mapping: IndexMap<String, String>,
        #[serde(flatten)]
        extensions: IndexMap<String, Value>,
    },
    PropertyName(String),
}

impl Discriminator {
    pub fn property_name(&self) -> &str {
        match self {
            Discriminator::Object { property_name, .. } => property_name,
            Discriminator::PropertyName(name) => name,
        }
    }

    /// Mapping entries, empty for the Swagger 2.0 form.
    pub fn mapping(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Discriminator::Object { mapping, .. } => Some(mapping),
            Discriminator::PropertyName(_) => None,
        }
    }

    pub fn mapping_mut(&mut self) -> Option<&mut IndexMap<String, String>> {
        match self {
            Discriminator::Object { mapping, .. } => Some(mapping),
            Discriminator::PropertyName(_) => None,
        }
    }
}

/// A borrowed child of a schema node, tagged with the keyword path it sits at
/// relative to its parent (e.g. `properties.name`, `allOf[1]`).
#[derive(Debug)]
pub enum SchemaChild<'a> {
    Schema(&'a Schema),
    Untyped(&'a Value),
}

/// Mutable counterpart of [`SchemaChild`].
#[derive(Debug)]
pub enum SchemaChildMut<'a> {
    Schema(&'a mut Schema),
    Untyped(&'a mut Value),
}

/// A JSON Schema object (Swagger 2.0 / OpenAPI 3.0-3.2 superset).
///
/// When `ref_path` is set the node is a reference. Conformant documents
/// carry nothing else alongside it, but siblings are tolerated and still
/// walked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaSlot>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<SchemaSlot>,

    #[serde(
        rename = "patternProperties",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub pattern_properties: IndexMap<String, SchemaSlot>,

    #[serde(
        rename = "unevaluatedProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub unevaluated_properties: Option<SchemaSlot>,

    #[serde(rename = "propertyNames", skip_serializing_if = "Option::is_none")]
    pub property_names: Option<SchemaSlot>,

    #[serde(
        rename = "dependentSchemas",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub dependent_schemas: IndexMap<String, SchemaSlot>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaSlot>,

    #[serde(rename = "prefixItems", default, skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<SchemaSlot>,

    #[serde(rename = "additionalItems", skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<SchemaSlot>,

    #[serde(rename = "unevaluatedItems", skip_serializing_if = "Option::is_none")]
    pub unevaluated_items: Option<SchemaSlot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<SchemaSlot>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaSlot>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaSlot>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaSlot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<SchemaSlot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // Conditionals
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<SchemaSlot>,

    #[serde(rename = "then", skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<SchemaSlot>,

    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<SchemaSlot>,

    // Local definitions
    #[serde(rename = "$defs", default, skip_serializing_if = "IndexMap::is_empty")]
    pub defs: IndexMap<String, SchemaSlot>,

    /// Draft-07 spelling of `$defs`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaSlot>,

    #[serde(rename = "contentSchema", skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<SchemaSlot>,

    // Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Constraints, annotations and `x-` extensions the graph engine does
    /// not interpret. Kept verbatim so documents round-trip.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    /// A bare reference node.
    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: Some(ref_path.into()),
            ..Default::default()
        }
    }

    /// Every nested schema position, in keyword order.
    ///
    /// Boolean subschemas have no nested node and are skipped.
    pub fn children(&self) -> Vec<(String, SchemaChild<'_>)> {
        let mut out = Vec::new();

        for (keyword, map) in [
            ("properties", &self.properties),
            ("patternProperties", &self.pattern_properties),
            ("dependentSchemas", &self.dependent_schemas),
            ("$defs", &self.defs),
            ("definitions", &self.definitions),
        ] {
            for (key, slot) in map {
                if let Some(child) = slot.child() {
                    out.push((format!("{keyword}.{key}"), child));
                }
            }
        }

        for (keyword, list) in [
            ("allOf", &self.all_of),
            ("anyOf", &self.any_of),
            ("oneOf", &self.one_of),
            ("prefixItems", &self.prefix_items),
        ] {
            for (i, slot) in list.iter().enumerate() {
                if let Some(child) = slot.child() {
                    out.push((format!("{keyword}[{i}]"), child));
                }
            }
        }

        for (keyword, slot) in [
            ("not", &self.not),
            ("items", &self.items),
            ("additionalProperties", &self.additional_properties),
            ("additionalItems", &self.additional_items),
            ("unevaluatedProperties", &self.unevaluated_properties),
            ("unevaluatedItems", &self.unevaluated_items),
            ("contains", &self.contains),
            ("propertyNames", &self.property_names),
            ("contentSchema", &self.content_schema),
            ("if", &self.if_schema),
            ("then", &self.then_schema),
            ("else", &self.else_schema),
        ] {
            if let Some(child) = slot.as_ref().and_then(SchemaSlot::child) {
                out.push((keyword.to_string(), child));
            }
        }

        out
    }

    /// Mutable counterpart of [`Schema::children`], same order.
    pub fn children_mut(&mut self) -> Vec<(String, SchemaChildMut<'_>)> {
        let mut out = Vec::new();

        for (keyword, map) in [
            ("properties", &mut self.properties),
            ("patternProperties", &mut self.pattern_properties),
            ("dependentSchemas", &mut self.dependent_schemas),
            ("$defs", &mut self.defs),
            ("definitions", &mut self.definitions),
        ] {
            for (key, slot) in map {
                if let Some(child) = slot.child_mut() {
                    out.push((format!("{keyword}.{key}"), child));
                }
            }
        }

        for (keyword, list) in [
            ("allOf", &mut self.all_of),
            ("anyOf", &mut self.any_of),
            ("oneOf", &mut self.one_of),
            ("prefixItems", &mut self.prefix_items),
        ] {
            for (i, slot) in list.iter_mut().enumerate() {
                if let Some(child) = slot.child_mut() {
                    out.push((format!("{keyword}[{i}]"), child));
                }
            }
        }

        for (keyword, slot) in [
            ("not", &mut self.not),
            ("items", &mut self.items),
            ("additionalProperties", &mut self.additional_properties),
            ("additionalItems", &mut self.additional_items),
            ("unevaluatedProperties", &mut self.unevaluated_properties),
            ("unevaluatedItems", &mut self.unevaluated_items),
            ("contains", &mut self.contains),
            ("propertyNames", &mut self.property_names),
            ("contentSchema", &mut self.content_schema),
            ("if", &mut self.if_schema),
            ("then", &mut self.then_schema),
            ("else", &mut self.else_schema),
        ] {
            if let Some(child) = slot.as_mut().and_then(SchemaSlot::child_mut) {
                out.push((keyword.to_string(), child));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_node() {
        let s: Schema = serde_json::from_value(json!({"$ref": "#/components/schemas/Pet"})).unwrap();
        assert_eq!(s.ref_path.as_deref(), Some("#/components/schemas/Pet"));
        assert!(s.children().is_empty());
    }

    #[test]
    fn test_slot_shapes() {
        let s: Schema = serde_json::from_value(json!({
            "type": "object",
            "additionalProperties": false,
            "items": {"$ref": "#/definitions/Item"},
            "contains": {"type": "bogus", "$ref": "#/definitions/Other"},
        }))
        .unwrap();
        assert_eq!(s.additional_properties, Some(SchemaSlot::Bool(false)));
        assert!(matches!(s.items, Some(SchemaSlot::Schema(_))));
        // An unknown `type` cannot be promoted, so the mapping stays untyped.
        assert!(matches!(s.contains, Some(SchemaSlot::Untyped(_))));
    }

    #[test]
    fn test_tuple_items_are_untyped() {
        let s: Schema = serde_json::from_value(json!({
            "items": [{"$ref": "#/definitions/A"}, {"type": "string"}]
        }))
        .unwrap();
        match s.items {
            Some(SchemaSlot::Untyped(Value::Array(items))) => assert_eq!(items.len(), 2),
            other => panic!("expected untyped array, got {other:?}"),
        }
    }

    #[test]
    fn test_children_cover_keywords() {
        let s: Schema = serde_json::from_value(json!({
            "properties": {"a": {}},
            "patternProperties": {"^x": {}},
            "dependentSchemas": {"b": {}},
            "$defs": {"c": {}},
            "definitions": {"e": {}},
            "allOf": [{}], "anyOf": [{}], "oneOf": [{}], "prefixItems": [{}],
            "not": {},
            "items": {}, "additionalProperties": {}, "additionalItems": {},
            "unevaluatedProperties": {}, "unevaluatedItems": {}, "contains": {},
            "propertyNames": {}, "contentSchema": {},
            "if": {}, "then": {}, "else": true
        }))
        .unwrap();
        let paths: Vec<String> = s.children().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths.len(), 20);
        assert!(paths.contains(&"$defs.c".to_string()));
        assert!(paths.contains(&"prefixItems[0]".to_string()));
        assert!(!paths.contains(&"else".to_string()));
    }

    #[test]
    fn test_boolean_and_untyped_subschemas() {
        let s: Schema = serde_json::from_value(json!({
            "properties": {
                "anything": true,
                "odd": {"type": "x-custom", "$ref": "#/components/schemas/Odd"},
                "plain": {"$ref": "#/components/schemas/Plain"}
            },
            "allOf": [false, {"$ref": "#/components/schemas/Base"}],
            "not": true
        }))
        .unwrap();
        assert_eq!(s.properties["anything"], SchemaSlot::Bool(true));
        assert!(matches!(s.properties["odd"], SchemaSlot::Untyped(_)));
        assert_eq!(s.not, Some(SchemaSlot::Bool(true)));
        let paths: Vec<String> = s.children().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["properties.odd", "properties.plain", "allOf[1]"]);
    }

    #[test]
    fn test_discriminator_forms() {
        let legacy: Schema = serde_json::from_value(json!({"discriminator": "petType"})).unwrap();
        let d = legacy.discriminator.unwrap();
        assert_eq!(d.property_name(), "petType");
        assert!(d.mapping().is_none());

        let modern: Schema = serde_json::from_value(json!({
            "discriminator": {"propertyName": "kind", "mapping": {"dog": "Dog"}}
        }))
        .unwrap();
        let d = modern.discriminator.unwrap();
        assert_eq!(d.mapping().unwrap()["dog"], "Dog");
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let input = json!({"type": "string", "maxLength": 5, "x-internal": true});
        let s: Schema = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&s).unwrap(), input);
    }
}
