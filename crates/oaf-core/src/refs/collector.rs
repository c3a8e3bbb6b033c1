use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::parse::components::Components;
use crate::parse::example::ExampleOrRef;
use crate::parse::header::HeaderOrRef;
use crate::parse::link::LinkOrRef;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{CallbackOrRef, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::{Schema, SchemaChild};
use crate::parse::security::SecuritySchemeOrRef;
use crate::parse::spec::{Document, OpenApiSpec, SwaggerSpec, Variant};

use super::pointer::{self, ComponentKind};
use super::untyped::{self, UntypedRef};

/// Every pointer found in a document.
///
/// `refs` keeps each pointer string with the locations it was seen at.
/// `by_kind` only holds pointers that follow the variant's prefix
/// convention for their kind; anything else (external files, malformed
/// paths) stays in `refs` alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceIndex {
    pub refs: BTreeMap<String, Vec<String>>,
    pub by_kind: BTreeMap<ComponentKind, BTreeSet<String>>,
}

impl ReferenceIndex {
    /// Pointers of one kind, sorted.
    pub fn pointers(&self, kind: ComponentKind) -> impl Iterator<Item = &str> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Locations a pointer was seen at.
    pub fn locations(&self, pointer: &str) -> &[String] {
        self.refs.get(pointer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Decoded bare names referenced for one kind.
    pub fn names(&self, kind: ComponentKind, variant: Variant) -> BTreeSet<String> {
        self.pointers(kind)
            .filter_map(|p| pointer::bare_name(p, kind, variant))
            .collect()
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.refs.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Which parts of a document to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectScope {
    /// Every location a pointer can occur.
    Full,
    /// Everything except the bodies of the named schemas. References found
    /// this way are the roots that reachability starts from.
    EntryPoints,
}

/// Walks a document and records every pointer it holds. Never mutates.
pub struct RefCollector {
    variant: Variant,
    index: ReferenceIndex,
}

impl RefCollector {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            index: ReferenceIndex::default(),
        }
    }

    /// Collect the whole document.
    pub fn collect(doc: &Document, scope: CollectScope) -> ReferenceIndex {
        let mut collector = Self::new(doc.variant());
        match doc {
            Document::Legacy(spec) => collector.collect_legacy(spec, scope),
            Document::Modern(spec) => collector.collect_modern(spec, scope),
        }
        collector.into_index()
    }

    pub fn into_index(self) -> ReferenceIndex {
        self.index
    }

    /// Record `pointer` at `location`, tagged as `kind` if it follows that
    /// kind's prefix convention.
    pub fn record(&mut self, pointer: &str, kind: ComponentKind, location: String) {
        self.index
            .refs
            .entry(pointer.to_string())
            .or_default()
            .push(location);
        if pointer::raw_name(pointer, kind, self.variant).is_some() {
            self.index
                .by_kind
                .entry(kind)
                .or_default()
                .insert(pointer.to_string());
        }
    }

    /// Discriminator mapping values name schemas either by pointer or by
    /// bare name. Bare names are indexed under their schema pointer.
    fn record_mapping(&mut self, target: &str, location: String) {
        if pointer::is_pointer_like(target) {
            self.record(target, ComponentKind::Schema, location);
        } else if let Some(full) = pointer::build(ComponentKind::Schema, self.variant, target) {
            self.record(&full, ComponentKind::Schema, location);
        }
    }

    fn collect_legacy(&mut self, spec: &SwaggerSpec, scope: CollectScope) {
        for (path, item) in &spec.paths {
            self.collect_path_item(item, &format!("paths.{path}"));
        }
        if scope == CollectScope::Full {
            for (name, schema) in &spec.definitions {
                self.collect_schema(schema, &format!("definitions.{name}"));
            }
        }
        for (name, param) in &spec.parameters {
            self.collect_parameter_body(param, &format!("parameters.{name}"));
        }
        for (name, response) in &spec.responses {
            self.collect_response_body(response, &format!("responses.{name}"));
        }
    }

    fn collect_modern(&mut self, spec: &OpenApiSpec, scope: CollectScope) {
        for (path, item) in &spec.paths {
            self.collect_path_item(item, &format!("paths.{path}"));
        }
        for (name, item) in &spec.webhooks {
            self.collect_path_item(item, &format!("webhooks.{name}"));
        }
        if let Some(components) = &spec.components {
            self.collect_components(components, scope);
        }
    }

    fn collect_components(&mut self, components: &Components, scope: CollectScope) {
        if scope == CollectScope::Full {
            for (name, schema) in &components.schemas {
                self.collect_schema(schema, &format!("components.schemas.{name}"));
            }
        }
        for (name, response) in &components.responses {
            self.collect_response(response, &format!("components.responses.{name}"));
        }
        for (name, param) in &components.parameters {
            self.collect_parameter(param, &format!("components.parameters.{name}"));
        }
        self.collect_examples(&components.examples, "components.examples");
        for (name, body) in &components.request_bodies {
            self.collect_request_body(body, &format!("components.requestBodies.{name}"));
        }
        self.collect_headers(&components.headers, "components.headers");
        for (name, scheme) in &components.security_schemes {
            if let SecuritySchemeOrRef::Ref { ref_path, .. } = scheme {
                self.record(
                    ref_path,
                    ComponentKind::SecurityScheme,
                    format!("components.securitySchemes.{name}"),
                );
            }
        }
        self.collect_links(&components.links, "components.links");
        for (name, callback) in &components.callbacks {
            self.collect_callback(callback, &format!("components.callbacks.{name}"));
        }
        for (name, item) in &components.path_items {
            self.collect_path_item(item, &format!("components.pathItems.{name}"));
        }
    }

    fn collect_path_item(&mut self, item: &PathItem, path: &str) {
        if let Some(ref_path) = &item.ref_path {
            self.record(ref_path, ComponentKind::PathItem, path.to_string());
        }
        for (i, param) in item.parameters.iter().enumerate() {
            self.collect_parameter(param, &format!("{path}.parameters[{i}]"));
        }
        for (method, op) in item.operations() {
            self.collect_operation(op, &format!("{path}.{method}"));
        }
    }

    fn collect_operation(&mut self, op: &Operation, path: &str) {
        for (i, param) in op.parameters.iter().enumerate() {
            self.collect_parameter(param, &format!("{path}.parameters[{i}]"));
        }
        if let Some(body) = &op.request_body {
            self.collect_request_body(body, &format!("{path}.requestBody"));
        }
        for (status, response) in &op.responses {
            self.collect_response(response, &format!("{path}.responses.{status}"));
        }
        for (name, callback) in &op.callbacks {
            self.collect_callback(callback, &format!("{path}.callbacks.{name}"));
        }
    }

    fn collect_parameter(&mut self, param: &ParameterOrRef, path: &str) {
        match param {
            ParameterOrRef::Ref { ref_path, .. } => {
                self.record(ref_path, ComponentKind::Parameter, path.to_string())
            }
            ParameterOrRef::Parameter(p) => self.collect_parameter_body(p, path),
        }
    }

    fn collect_parameter_body(&mut self, param: &Parameter, path: &str) {
        if let Some(schema) = &param.schema {
            self.collect_schema(schema, &format!("{path}.schema"));
        }
        self.collect_content(&param.content, &format!("{path}.content"));
        self.collect_examples(&param.examples, &format!("{path}.examples"));
    }

    fn collect_request_body(&mut self, body: &RequestBodyOrRef, path: &str) {
        match body {
            RequestBodyOrRef::Ref { ref_path, .. } => {
                self.record(ref_path, ComponentKind::RequestBody, path.to_string())
            }
            RequestBodyOrRef::RequestBody(rb) => {
                self.collect_content(&rb.content, &format!("{path}.content"))
            }
        }
    }

    fn collect_response(&mut self, response: &ResponseOrRef, path: &str) {
        match response {
            ResponseOrRef::Ref { ref_path, .. } => {
                self.record(ref_path, ComponentKind::Response, path.to_string())
            }
            ResponseOrRef::Response(r) => self.collect_response_body(r, path),
        }
    }

    fn collect_response_body(&mut self, response: &Response, path: &str) {
        if let Some(schema) = &response.schema {
            self.collect_schema(schema, &format!("{path}.schema"));
        }
        self.collect_content(&response.content, &format!("{path}.content"));
        self.collect_headers(&response.headers, &format!("{path}.headers"));
        self.collect_links(&response.links, &format!("{path}.links"));
    }

    fn collect_content(&mut self, content: &IndexMap<String, MediaType>, path: &str) {
        for (media, mt) in content {
            let base = format!("{path}.{media}");
            if let Some(schema) = &mt.schema {
                self.collect_schema(schema, &format!("{base}.schema"));
            }
            if let Some(schema) = &mt.item_schema {
                self.collect_schema(schema, &format!("{base}.itemSchema"));
            }
            self.collect_examples(&mt.examples, &format!("{base}.examples"));
            for (field, encoding) in &mt.encoding {
                self.collect_headers(
                    &encoding.headers,
                    &format!("{base}.encoding.{field}.headers"),
                );
            }
        }
    }

    fn collect_headers(&mut self, headers: &IndexMap<String, HeaderOrRef>, path: &str) {
        for (name, header) in headers {
            let location = format!("{path}.{name}");
            match header {
                HeaderOrRef::Ref { ref_path, .. } => {
                    self.record(ref_path, ComponentKind::Header, location)
                }
                HeaderOrRef::Header(h) => {
                    if let Some(schema) = &h.schema {
                        self.collect_schema(schema, &format!("{location}.schema"));
                    }
                    self.collect_content(&h.content, &format!("{location}.content"));
                    self.collect_examples(&h.examples, &format!("{location}.examples"));
                }
            }
        }
    }

    fn collect_examples(&mut self, examples: &IndexMap<String, ExampleOrRef>, path: &str) {
        for (name, example) in examples {
            if let ExampleOrRef::Ref { ref_path, .. } = example {
                self.record(ref_path, ComponentKind::Example, format!("{path}.{name}"));
            }
        }
    }

    fn collect_links(&mut self, links: &IndexMap<String, LinkOrRef>, path: &str) {
        for (name, link) in links {
            if let LinkOrRef::Ref { ref_path, .. } = link {
                self.record(ref_path, ComponentKind::Link, format!("{path}.{name}"));
            }
        }
    }

    fn collect_callback(&mut self, callback: &CallbackOrRef, path: &str) {
        match callback {
            CallbackOrRef::Ref { ref_path, .. } => {
                self.record(ref_path, ComponentKind::Callback, path.to_string())
            }
            CallbackOrRef::Callback(expressions) => {
                for (expression, item) in expressions {
                    self.collect_path_item(item, &format!("{path}.{expression}"));
                }
            }
        }
    }

    /// Walk a schema node and everything nested in it.
    pub fn collect_schema(&mut self, schema: &Schema, path: &str) {
        if let Some(ref_path) = &schema.ref_path {
            self.record(ref_path, ComponentKind::Schema, path.to_string());
        }

        if let Some(mapping) = schema.discriminator.as_ref().and_then(|d| d.mapping()) {
            for (key, target) in mapping {
                self.record_mapping(target, format!("{path}.discriminator.mapping.{key}"));
            }
        }

        for (segment, child) in schema.children() {
            let child_path = format!("{path}.{segment}");
            match child {
                SchemaChild::Schema(child) => self.collect_schema(child, &child_path),
                SchemaChild::Untyped(value) => self.collect_untyped(value, &child_path),
            }
        }
    }

    fn collect_untyped(&mut self, value: &Value, path: &str) {
        untyped::visit_refs(value, path, &mut |found, location| match found {
            UntypedRef::Pointer(p) => self.record(p, ComponentKind::Schema, location),
            UntypedRef::Mapping(target) => self.record_mapping(target, location),
        });
    }
}
