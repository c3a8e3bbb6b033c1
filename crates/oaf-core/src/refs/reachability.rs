use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;

use crate::parse::schema::Schema;
use crate::parse::spec::Variant;

use super::collector::{RefCollector, ReferenceIndex};
use super::pointer::{self, ComponentKind};

/// Names of the schemas in `schemas` that are transitively referenced from
/// the pointers already recorded in `index`.
///
/// Breadth-first: each newly reached schema body is collected on its own and
/// the schema pointers it holds are queued. A name is visited at most once,
/// so self references and reference cycles terminate.
pub fn reachable_schemas(
    index: &ReferenceIndex,
    schemas: &IndexMap<String, Schema>,
    variant: Variant,
) -> BTreeSet<String> {
    let is_defined = |name: &str| schemas.contains_key(name);

    let mut visited = BTreeSet::new();
    let mut frontier = VecDeque::new();

    for ptr in index.pointers(ComponentKind::Schema) {
        if let Some(name) = pointer::resolve_name(ptr, ComponentKind::Schema, variant, is_defined)
            && visited.insert(name.clone())
        {
            frontier.push_back(name);
        }
    }

    while let Some(name) = frontier.pop_front() {
        let Some(body) = schemas.get(&name) else {
            continue;
        };

        let mut collector = RefCollector::new(variant);
        collector.collect_schema(body, &name);
        let found = collector.into_index();

        for ptr in found.pointers(ComponentKind::Schema) {
            if let Some(next) =
                pointer::resolve_name(ptr, ComponentKind::Schema, variant, is_defined)
                && visited.insert(next.clone())
            {
                log::debug!("schema '{next}' reached through '{name}'");
                frontier.push_back(next);
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;
    use crate::refs::collector::CollectScope;

    fn reachable(yaml: &str) -> Vec<String> {
        let doc = from_yaml(yaml).unwrap();
        let index = RefCollector::collect(&doc, CollectScope::EntryPoints);
        let schemas = doc.schemas().cloned().unwrap_or_default();
        reachable_schemas(&index, &schemas, doc.variant())
            .into_iter()
            .collect()
    }

    #[test]
    fn test_deep_items_chain() {
        let names = reachable(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/L1"}
components:
  schemas:
    L1: {type: array, items: {$ref: "#/components/schemas/L2"}}
    L2: {type: array, items: {$ref: "#/components/schemas/L3"}}
    L3: {type: array, items: {$ref: "#/components/schemas/L4"}}
    L4: {type: string}
    Orphan: {type: string}
"##,
        );
        assert_eq!(names, vec!["L1", "L2", "L3", "L4"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let names = reachable(
            r##"
swagger: "2.0"
info: {title: T, version: "1"}
paths:
  /nodes:
    get:
      responses:
        "200":
          description: ok
          schema: {$ref: "#/definitions/Node"}
definitions:
  Node:
    type: object
    properties:
      self: {$ref: "#/definitions/Node"}
      edge: {$ref: "#/definitions/Edge"}
  Edge:
    type: object
    properties:
      to: {$ref: "#/definitions/Node"}
  LoopA: {$ref: "#/definitions/LoopB"}
  LoopB: {$ref: "#/definitions/LoopA"}
"##,
        );
        assert_eq!(names, vec!["Edge", "Node"]);
    }

    #[test]
    fn test_untyped_items_keeps_target() {
        let names = reachable(
            r##"
openapi: 3.1.0
info: {title: T, version: "1"}
paths:
  /items:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/ItemList"}
components:
  schemas:
    ItemList:
      type: array
      items:
        type: custom-item
        $ref: "#/components/schemas/Item"
    Item: {type: object}
"##,
        );
        assert_eq!(names, vec!["Item", "ItemList"]);
    }

    #[test]
    fn test_percent_escaped_seed() {
        let names = reachable(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths: {}
components:
  parameters:
    Filter:
      name: filter
      in: query
      schema: {$ref: "#/components/schemas/Page%5BUser%5D"}
  schemas:
    Page[User]: {type: object}
"##,
        );
        assert_eq!(names, vec!["Page[User]"]);
    }
}
