//! In-place rewriting of schema pointers after a rename.
//!
//! Visits the same locations as the collector. Only pointers that decode to
//! a renamed schema change; every other pointer is left byte-for-byte as is.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::parse::components::Components;
use crate::parse::header::HeaderOrRef;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{CallbackOrRef, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::{Schema, SchemaChildMut};
use crate::parse::spec::{Document, Variant};

use super::pointer::{self, ComponentKind};
use super::untyped::{self, UntypedRef};

/// Old bare schema name → new bare schema name.
pub type RenameMap = BTreeMap<String, String>;

/// One pointer or mapping value that was changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenRef {
    pub location: String,
    /// Old bare name of the schema the value targets.
    pub schema: String,
    pub before: String,
    pub after: String,
}

pub struct GraphRewriter {
    variant: Variant,
    /// Old pointer (literal, token-escaped and percent-escaped) → old bare
    /// name and new pointer.
    pointers: HashMap<String, (String, String)>,
    /// Old bare name → new bare name, for discriminator mapping values.
    bare: HashMap<String, String>,
    /// Renamed names that also name a component of another kind.
    ambiguous: BTreeMap<String, Vec<ComponentKind>>,
    rewritten: Vec<RewrittenRef>,
}

impl GraphRewriter {
    /// Build the rewrite tables for `renames` against `doc`'s pointer
    /// conventions.
    pub fn new(doc: &Document, renames: &RenameMap) -> Self {
        let variant = doc.variant();
        let mut pointers = HashMap::new();
        let mut bare = HashMap::new();
        let mut ambiguous = BTreeMap::new();

        for (old, new) in renames {
            let (Some(prefix), Some(target)) = (
                ComponentKind::Schema.prefix(variant),
                pointer::build(ComponentKind::Schema, variant, new),
            ) else {
                continue;
            };
            let segments = [
                old.clone(),
                pointer::escape_token(old).into_owned(),
                pointer::encode_segment(old),
            ];
            for segment in segments.into_iter().filter(|s| !s.contains('/')) {
                pointers.insert(format!("{prefix}{segment}"), (old.clone(), target.clone()));
            }
            bare.insert(old.clone(), new.clone());

            let others = other_kinds_named(doc, old);
            if !others.is_empty() {
                ambiguous.insert(old.clone(), others);
            }
        }

        Self {
            variant,
            pointers,
            bare,
            ambiguous,
            rewritten: Vec::new(),
        }
    }

    /// Rewrite every matching pointer in `doc`.
    pub fn rewrite(mut self, doc: &mut Document) -> Vec<RewrittenRef> {
        if self.pointers.is_empty() {
            return Vec::new();
        }
        match doc {
            Document::Legacy(spec) => {
                for (path, item) in &mut spec.paths {
                    self.rewrite_path_item(item, &format!("paths.{path}"));
                }
                for (name, schema) in &mut spec.definitions {
                    self.rewrite_schema(schema, &format!("definitions.{name}"));
                }
                for (name, param) in &mut spec.parameters {
                    self.rewrite_parameter_body(param, &format!("parameters.{name}"));
                }
                for (name, response) in &mut spec.responses {
                    self.rewrite_response_body(response, &format!("responses.{name}"));
                }
            }
            Document::Modern(spec) => {
                for (path, item) in &mut spec.paths {
                    self.rewrite_path_item(item, &format!("paths.{path}"));
                }
                for (name, item) in &mut spec.webhooks {
                    self.rewrite_path_item(item, &format!("webhooks.{name}"));
                }
                if let Some(components) = &mut spec.components {
                    self.rewrite_components(components);
                }
            }
        }
        self.rewritten
    }

    fn rewrite_components(&mut self, components: &mut Components) {
        for (name, schema) in &mut components.schemas {
            self.rewrite_schema(schema, &format!("components.schemas.{name}"));
        }
        for (name, response) in &mut components.responses {
            self.rewrite_response(response, &format!("components.responses.{name}"));
        }
        for (name, param) in &mut components.parameters {
            self.rewrite_parameter(param, &format!("components.parameters.{name}"));
        }
        for (name, body) in &mut components.request_bodies {
            self.rewrite_request_body(body, &format!("components.requestBodies.{name}"));
        }
        self.rewrite_headers(&mut components.headers, "components.headers");
        for (name, callback) in &mut components.callbacks {
            self.rewrite_callback(callback, &format!("components.callbacks.{name}"));
        }
        for (name, item) in &mut components.path_items {
            self.rewrite_path_item(item, &format!("components.pathItems.{name}"));
        }
    }

    fn rewrite_path_item(&mut self, item: &mut PathItem, path: &str) {
        for (i, param) in item.parameters.iter_mut().enumerate() {
            self.rewrite_parameter(param, &format!("{path}.parameters[{i}]"));
        }
        for (method, op) in item.operations_mut() {
            self.rewrite_operation(op, &format!("{path}.{method}"));
        }
    }

    fn rewrite_operation(&mut self, op: &mut Operation, path: &str) {
        for (i, param) in op.parameters.iter_mut().enumerate() {
            self.rewrite_parameter(param, &format!("{path}.parameters[{i}]"));
        }
        if let Some(body) = &mut op.request_body {
            self.rewrite_request_body(body, &format!("{path}.requestBody"));
        }
        for (status, response) in &mut op.responses {
            self.rewrite_response(response, &format!("{path}.responses.{status}"));
        }
        for (name, callback) in &mut op.callbacks {
            self.rewrite_callback(callback, &format!("{path}.callbacks.{name}"));
        }
    }

    fn rewrite_parameter(&mut self, param: &mut ParameterOrRef, path: &str) {
        if let ParameterOrRef::Parameter(p) = param {
            self.rewrite_parameter_body(p, path);
        }
    }

    fn rewrite_parameter_body(&mut self, param: &mut Parameter, path: &str) {
        if let Some(schema) = &mut param.schema {
            self.rewrite_schema(schema, &format!("{path}.schema"));
        }
        self.rewrite_content(&mut param.content, &format!("{path}.content"));
    }

    fn rewrite_request_body(&mut self, body: &mut RequestBodyOrRef, path: &str) {
        if let RequestBodyOrRef::RequestBody(rb) = body {
            self.rewrite_content(&mut rb.content, &format!("{path}.content"));
        }
    }

    fn rewrite_response(&mut self, response: &mut ResponseOrRef, path: &str) {
        if let ResponseOrRef::Response(r) = response {
            self.rewrite_response_body(r, path);
        }
    }

    fn rewrite_response_body(&mut self, response: &mut Response, path: &str) {
        if let Some(schema) = &mut response.schema {
            self.rewrite_schema(schema, &format!("{path}.schema"));
        }
        self.rewrite_content(&mut response.content, &format!("{path}.content"));
        self.rewrite_headers(&mut response.headers, &format!("{path}.headers"));
    }

    fn rewrite_content(&mut self, content: &mut IndexMap<String, MediaType>, path: &str) {
        for (media, mt) in content {
            let base = format!("{path}.{media}");
            if let Some(schema) = &mut mt.schema {
                self.rewrite_schema(schema, &format!("{base}.schema"));
            }
            if let Some(schema) = &mut mt.item_schema {
                self.rewrite_schema(schema, &format!("{base}.itemSchema"));
            }
            for (field, encoding) in &mut mt.encoding {
                self.rewrite_headers(
                    &mut encoding.headers,
                    &format!("{base}.encoding.{field}.headers"),
                );
            }
        }
    }

    fn rewrite_headers(&mut self, headers: &mut IndexMap<String, HeaderOrRef>, path: &str) {
        for (name, header) in headers {
            if let HeaderOrRef::Header(h) = header {
                let location = format!("{path}.{name}");
                if let Some(schema) = &mut h.schema {
                    self.rewrite_schema(schema, &format!("{location}.schema"));
                }
                self.rewrite_content(&mut h.content, &format!("{location}.content"));
            }
        }
    }

    fn rewrite_callback(&mut self, callback: &mut CallbackOrRef, path: &str) {
        if let CallbackOrRef::Callback(expressions) = callback {
            for (expression, item) in expressions {
                self.rewrite_path_item(item, &format!("{path}.{expression}"));
            }
        }
    }

    /// Rewrite a schema node and everything nested in it.
    pub fn rewrite_schema(&mut self, schema: &mut Schema, path: &str) {
        if let Some(ref_path) = &mut schema.ref_path
            && let Some(after) = self.pointer_replacement(ref_path, path)
        {
            *ref_path = after;
        }

        if let Some(mapping) = schema.discriminator.as_mut().and_then(|d| d.mapping_mut()) {
            for (key, target) in mapping.iter_mut() {
                let location = format!("{path}.discriminator.mapping.{key}");
                if let Some(after) = self.mapping_replacement(target, &location) {
                    *target = after;
                }
            }
        }

        for (segment, child) in schema.children_mut() {
            let child_path = format!("{path}.{segment}");
            match child {
                SchemaChildMut::Schema(child) => self.rewrite_schema(child, &child_path),
                SchemaChildMut::Untyped(value) => self.rewrite_untyped(value, &child_path),
            }
        }
    }

    fn rewrite_untyped(&mut self, value: &mut Value, path: &str) {
        untyped::rewrite_refs(value, path, &mut |found, location| match found {
            UntypedRef::Pointer(p) => self.pointer_replacement(p, location),
            UntypedRef::Mapping(target) => self.mapping_replacement(target, location),
        });
    }

    /// Exact table hit first, then any other escaping of a renamed name.
    fn pointer_replacement(&mut self, before: &str, location: &str) -> Option<String> {
        let (schema, after) = match self.pointers.get(before) {
            Some(hit) => hit.clone(),
            None => {
                let old = pointer::bare_name(before, ComponentKind::Schema, self.variant)?;
                let new = self.bare.get(&old)?;
                let after = pointer::build(ComponentKind::Schema, self.variant, new)?;
                (old, after)
            }
        };
        self.record(location, &schema, before, &after);
        Some(after)
    }

    fn mapping_replacement(&mut self, before: &str, location: &str) -> Option<String> {
        if pointer::is_pointer_like(before) {
            return self.pointer_replacement(before, location);
        }
        let after = self.bare.get(before)?.clone();
        if let Some(others) = self.ambiguous.get(before) {
            let kinds: Vec<String> = others.iter().map(ToString::to_string).collect();
            log::warn!(
                "discriminator mapping at {location} uses bare name '{before}', which also names \
                 a {}; rewriting it as a schema name",
                kinds.join(" and a ")
            );
        }
        self.record(location, before, before, &after);
        Some(after)
    }

    fn record(&mut self, location: &str, schema: &str, before: &str, after: &str) {
        log::debug!("rewrote {location}: {before} -> {after}");
        self.rewritten.push(RewrittenRef {
            location: location.to_string(),
            schema: schema.to_string(),
            before: before.to_string(),
            after: after.to_string(),
        });
    }
}

/// Convenience wrapper: build the tables and rewrite in one call.
pub fn rewrite_document(doc: &mut Document, renames: &RenameMap) -> Vec<RewrittenRef> {
    GraphRewriter::new(doc, renames).rewrite(doc)
}

/// Component kinds other than schemas that define `name`.
fn other_kinds_named(doc: &Document, name: &str) -> Vec<ComponentKind> {
    let mut kinds = Vec::new();
    match doc {
        Document::Legacy(spec) => {
            if spec.parameters.contains_key(name) {
                kinds.push(ComponentKind::Parameter);
            }
            if spec.responses.contains_key(name) {
                kinds.push(ComponentKind::Response);
            }
            if spec.security_definitions.contains_key(name) {
                kinds.push(ComponentKind::SecurityScheme);
            }
        }
        Document::Modern(spec) => {
            let Some(c) = &spec.components else {
                return kinds;
            };
            let checks = [
                (ComponentKind::Parameter, c.parameters.contains_key(name)),
                (ComponentKind::Response, c.responses.contains_key(name)),
                (ComponentKind::RequestBody, c.request_bodies.contains_key(name)),
                (ComponentKind::Header, c.headers.contains_key(name)),
                (ComponentKind::SecurityScheme, c.security_schemes.contains_key(name)),
                (ComponentKind::Link, c.links.contains_key(name)),
                (ComponentKind::Callback, c.callbacks.contains_key(name)),
                (ComponentKind::Example, c.examples.contains_key(name)),
                (ComponentKind::PathItem, c.path_items.contains_key(name)),
            ];
            kinds.extend(checks.into_iter().filter(|(_, hit)| *hit).map(|(k, _)| k));
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;
    use crate::parse::schema::SchemaSlot;
    use serde_json::json;

    fn renames(pairs: &[(&str, &str)]) -> RenameMap {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_literal_and_escaped_pointers() {
        let mut doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  /u:
    get:
      parameters:
        - name: q
          in: query
          schema: {$ref: "#/components/schemas/Response%5BUser%5D"}
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Response[User]"}
components:
  schemas:
    User: {type: object}
"##,
        )
        .unwrap();
        let changed = rewrite_document(&mut doc, &renames(&[("Response[User]", "ResponseOfUser")]));
        assert_eq!(changed.len(), 2);
        let yaml = doc.to_yaml().unwrap();
        assert!(!yaml.contains("Response[User]"));
        assert!(!yaml.contains("%5B"));
        assert_eq!(yaml.matches("#/components/schemas/ResponseOfUser").count(), 2);
    }

    #[test]
    fn test_discriminator_both_forms() {
        let mut schema: Schema = serde_json::from_value(json!({
            "oneOf": [{"$ref": "#/components/schemas/Box<Cat>"}],
            "discriminator": {
                "propertyName": "kind",
                "mapping": {
                    "cat": "#/components/schemas/Box<Cat>",
                    "bare": "Box<Cat>",
                    "dog": "Dog"
                }
            }
        }))
        .unwrap();
        let doc = from_yaml("openapi: 3.0.3\ninfo: {title: T, version: '1'}\n").unwrap();
        let mut rewriter = GraphRewriter::new(&doc, &renames(&[("Box<Cat>", "BoxOfCat")]));
        rewriter.rewrite_schema(&mut schema, "root");
        let mapping = schema.discriminator.as_ref().unwrap().mapping().unwrap();
        assert_eq!(mapping["cat"], "#/components/schemas/BoxOfCat");
        assert_eq!(mapping["bare"], "BoxOfCat");
        assert_eq!(mapping["dog"], "Dog");
        assert_eq!(
            schema.one_of[0].as_schema().unwrap().ref_path.as_deref(),
            Some("#/components/schemas/BoxOfCat")
        );
    }

    #[test]
    fn test_untyped_slot_rewritten() {
        let mut schema = Schema {
            items: Some(SchemaSlot::Untyped(json!([
                {"$ref": "#/definitions/Pair[A,B]"},
                {"$ref": "#/definitions/Other"}
            ]))),
            ..Default::default()
        };
        let doc = from_yaml("swagger: '2.0'\ninfo: {title: T, version: '1'}\n").unwrap();
        let mut rewriter = GraphRewriter::new(&doc, &renames(&[("Pair[A,B]", "PairOfAAndB")]));
        rewriter.rewrite_schema(&mut schema, "root");
        let Some(SchemaSlot::Untyped(items)) = &schema.items else {
            panic!("items should stay untyped");
        };
        assert_eq!(items[0]["$ref"], "#/definitions/PairOfAAndB");
        assert_eq!(items[1]["$ref"], "#/definitions/Other");
    }

    #[test]
    fn test_unrelated_and_nested_pointers_untouched() {
        let mut schema = Schema::reference("#/components/schemas/A[B]/properties/id");
        let doc = from_yaml("openapi: 3.0.3\ninfo: {title: T, version: '1'}\n").unwrap();
        let mut rewriter = GraphRewriter::new(&doc, &renames(&[("A[B]", "AOfB")]));
        rewriter.rewrite_schema(&mut schema, "root");
        assert_eq!(
            schema.ref_path.as_deref(),
            Some("#/components/schemas/A[B]/properties/id")
        );
        assert!(rewriter.rewritten.is_empty());
    }

    #[test]
    fn test_ambiguous_bare_name_still_rewritten() {
        let doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
components:
  responses:
    Wrapped[Pet]: {description: shares its name with a schema}
"##,
        )
        .unwrap();
        let mut rewriter = GraphRewriter::new(&doc, &renames(&[("Wrapped[Pet]", "WrappedOfPet")]));
        assert_eq!(rewriter.ambiguous["Wrapped[Pet]"], vec![ComponentKind::Response]);

        let mut schema: Schema = serde_json::from_value(json!({
            "discriminator": {"propertyName": "kind", "mapping": {"pet": "Wrapped[Pet]"}}
        }))
        .unwrap();
        rewriter.rewrite_schema(&mut schema, "root");
        let mapping = schema.discriminator.as_ref().unwrap().mapping().unwrap();
        assert_eq!(mapping["pet"], "WrappedOfPet");
    }

    #[test]
    fn test_lowercase_and_partial_escapes_rewritten() {
        let mut doc = from_yaml(
            r##"
openapi: 3.1.0
info: {title: T, version: "1"}
paths:
  /u:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                oneOf:
                  - {$ref: "#/components/schemas/Page%5bUser%5d"}
                  - {$ref: "#/components/schemas/Page%5BUser]"}
"##,
        )
        .unwrap();
        let changed = rewrite_document(&mut doc, &renames(&[("Page[User]", "PageOfUser")]));
        assert_eq!(changed.len(), 2);
        assert!(changed.iter().all(|r| r.schema == "Page[User]"));
        let yaml = doc.to_yaml().unwrap();
        assert_eq!(yaml.matches("#/components/schemas/PageOfUser").count(), 2);
        assert!(!yaml.contains("Page%5"));
    }

    #[test]
    fn test_token_escaped_names_rewritten() {
        let mut schema: Schema = serde_json::from_value(json!({
            "allOf": [
                {"$ref": "#/definitions/v1~1Page[User]"},
                {"$ref": "#/definitions/v1~1Page%5BUser%5D"}
            ]
        }))
        .unwrap();
        let doc = from_yaml("swagger: '2.0'\ninfo: {title: T, version: '1'}\n").unwrap();
        let mut rewriter =
            GraphRewriter::new(&doc, &renames(&[("v1/Page[User]", "v1/PageOfUser")]));
        rewriter.rewrite_schema(&mut schema, "root");
        for child in &schema.all_of {
            assert_eq!(
                child.as_schema().unwrap().ref_path.as_deref(),
                Some("#/definitions/v1~1PageOfUser")
            );
        }
        assert_eq!(rewriter.rewritten.len(), 2);
    }
}
