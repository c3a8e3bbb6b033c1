use crate::parse::spec::Document;
use crate::refs::{CollectScope, RefCollector, reachable_schemas};

use super::result::{AppliedFix, FixKind, FixResult};

/// Remove path items that have no operations and no `$ref`.
pub fn prune_empty_paths(doc: &mut Document, result: &mut FixResult) {
    let mut empty: Vec<String> = doc
        .paths()
        .iter()
        .filter(|(_, item)| item.is_empty())
        .map(|(path, _)| path.clone())
        .collect();
    empty.sort();

    let paths = doc.paths_mut();
    for path in empty {
        paths.shift_remove(&path);
        result.push(AppliedFix {
            kind: FixKind::PrunedEmptyPath,
            path: format!("paths.{path}"),
            description: format!("removed path '{path}' with no operations"),
            before: Some(path),
            after: None,
        });
    }
}

/// Remove schemas that nothing outside the schema collection reaches.
///
/// When a modern document's `components` is left with no category and no
/// vendor field, the container is dropped as well.
pub fn prune_unused_schemas(doc: &mut Document, result: &mut FixResult) {
    let index = RefCollector::collect(doc, CollectScope::EntryPoints);
    let variant = doc.variant();
    let location = doc.schemas_location();

    // Phase 1: decide what goes, in sorted order
    let Some(schemas) = doc.schemas() else {
        return;
    };
    let reachable = reachable_schemas(&index, schemas, variant);
    let mut unused: Vec<String> = schemas
        .keys()
        .filter(|name| !reachable.contains(*name))
        .cloned()
        .collect();
    if unused.is_empty() {
        return;
    }
    unused.sort();

    // Phase 2: delete
    if let Some(schemas) = doc.schemas_mut() {
        for name in unused {
            schemas.shift_remove(&name);
            result.push(AppliedFix {
                kind: FixKind::PrunedUnusedSchema,
                path: format!("{location}.{name}"),
                description: format!("removed unreferenced schema '{name}'"),
                before: Some(name),
                after: None,
            });
        }
    }

    // Phase 3: cascade emptiness up to the container
    if let Document::Modern(spec) = doc
        && spec.components.as_ref().is_some_and(|c| c.is_empty())
    {
        log::debug!("components left empty, removing it");
        spec.components = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;

    #[test]
    fn test_prune_empty_paths_sorted() {
        let mut doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  /z: {summary: nothing here}
  /live:
    get: {responses: {"204": {description: gone}}}
  /a: {}
  /shared: {$ref: "#/components/pathItems/Shared"}
"##,
        )
        .unwrap();
        let mut result = FixResult::default();
        prune_empty_paths(&mut doc, &mut result);
        let removed: Vec<&str> = result.fixes.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(removed, vec!["paths./a", "paths./z"]);
        assert_eq!(
            doc.paths().keys().collect::<Vec<_>>(),
            vec!["/live", "/shared"]
        );
    }

    #[test]
    fn test_components_removed_when_empty() {
        let mut doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    B: {type: string}
    A: {$ref: "#/components/schemas/B"}
"##,
        )
        .unwrap();
        let mut result = FixResult::default();
        prune_unused_schemas(&mut doc, &mut result);
        let removed: Vec<&str> = result.fixes.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(removed, vec!["components.schemas.A", "components.schemas.B"]);
        let Document::Modern(spec) = &doc else {
            panic!("expected a modern document");
        };
        assert!(spec.components.is_none());
    }

    #[test]
    fn test_vendor_field_keeps_components() {
        let mut doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths: {}
components:
  x-owner: platform-team
  schemas:
    Orphan: {type: object}
"##,
        )
        .unwrap();
        let mut result = FixResult::default();
        prune_unused_schemas(&mut doc, &mut result);
        let Document::Modern(spec) = &doc else {
            panic!("expected a modern document");
        };
        let components = spec.components.as_ref().unwrap();
        assert!(components.schemas.is_empty());
        assert_eq!(components.extensions["x-owner"], "platform-team");
        assert!(!doc.to_yaml().unwrap().contains("schemas"));
    }

    #[test]
    fn test_other_category_keeps_components() {
        let mut doc = from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
paths: {}
components:
  securitySchemes:
    token: {type: http, scheme: bearer}
  schemas:
    Orphan: {type: object}
"##,
        )
        .unwrap();
        let mut result = FixResult::default();
        prune_unused_schemas(&mut doc, &mut result);
        assert_eq!(result.count(), 1);
        let Document::Modern(spec) = &doc else {
            panic!("expected a modern document");
        };
        assert!(spec.components.is_some());
    }
}
