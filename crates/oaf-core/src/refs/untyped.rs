//! Reference walk over schema mappings the parser left untyped.
//!
//! Mirrors [`Schema::children`](crate::parse::schema::Schema::children)
//! keyword for keyword; a keyword missing here would drop references that
//! arrive in the untyped shape.

use serde_json::Value;

/// Nesting limit for untyped mappings. Deeper branches are skipped.
pub const MAX_DEPTH: usize = 100;

const SINGLE_KEYWORDS: [&str; 12] = [
    "items",
    "additionalProperties",
    "additionalItems",
    "unevaluatedProperties",
    "unevaluatedItems",
    "contains",
    "propertyNames",
    "contentSchema",
    "not",
    "if",
    "then",
    "else",
];

const LIST_KEYWORDS: [&str; 4] = ["allOf", "anyOf", "oneOf", "prefixItems"];

// `definitions` is the draft-07 spelling of `$defs`.
const MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// A reference-bearing string found in an untyped mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntypedRef<'a> {
    /// A `$ref` value.
    Pointer(&'a str),
    /// A `discriminator.mapping` value: a pointer or a bare name.
    Mapping(&'a str),
}

/// Report every reference under `value`, with its textual location.
pub fn visit_refs(value: &Value, path: &str, visit: &mut dyn FnMut(UntypedRef<'_>, String)) {
    visit_at(value, path, 0, visit);
}

fn visit_at(
    value: &Value,
    path: &str,
    depth: usize,
    visit: &mut dyn FnMut(UntypedRef<'_>, String),
) {
    if depth >= MAX_DEPTH {
        log::warn!("untyped schema at {path} nests deeper than {MAX_DEPTH} levels, skipping");
        return;
    }

    let map = match value {
        Value::Object(map) => map,
        // Tuple-form `items: [...]`.
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                visit_at(item, &format!("{path}[{i}]"), depth + 1, visit);
            }
            return;
        }
        _ => return,
    };

    if let Some(Value::String(pointer)) = map.get("$ref") {
        visit(UntypedRef::Pointer(pointer), path.to_string());
    }

    for keyword in SINGLE_KEYWORDS {
        if let Some(child) = map.get(keyword) {
            visit_at(child, &format!("{path}.{keyword}"), depth + 1, visit);
        }
    }

    for keyword in LIST_KEYWORDS {
        if let Some(Value::Array(items)) = map.get(keyword) {
            for (i, item) in items.iter().enumerate() {
                visit_at(item, &format!("{path}.{keyword}[{i}]"), depth + 1, visit);
            }
        }
    }

    for keyword in MAP_KEYWORDS {
        if let Some(Value::Object(entries)) = map.get(keyword) {
            for (key, entry) in entries {
                visit_at(entry, &format!("{path}.{keyword}.{key}"), depth + 1, visit);
            }
        }
    }

    if let Some(Value::Object(mapping)) = map
        .get("discriminator")
        .and_then(|d| d.get("mapping"))
    {
        for (key, target) in mapping {
            if let Value::String(target) = target {
                visit(
                    UntypedRef::Mapping(target),
                    format!("{path}.discriminator.mapping.{key}"),
                );
            }
        }
    }
}

/// Rewrite references under `value` in place. `rewrite` returns the
/// replacement string, or `None` to leave the reference alone.
pub fn rewrite_refs(
    value: &mut Value,
    path: &str,
    rewrite: &mut dyn FnMut(UntypedRef<'_>, &str) -> Option<String>,
) {
    rewrite_at(value, path, 0, rewrite);
}

fn rewrite_at(
    value: &mut Value,
    path: &str,
    depth: usize,
    rewrite: &mut dyn FnMut(UntypedRef<'_>, &str) -> Option<String>,
) {
    if depth >= MAX_DEPTH {
        log::warn!("untyped schema at {path} nests deeper than {MAX_DEPTH} levels, skipping");
        return;
    }

    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                rewrite_at(item, &format!("{path}[{i}]"), depth + 1, rewrite);
            }
            return;
        }
        _ => return,
    };

    if let Some(Value::String(pointer)) = map.get_mut("$ref")
        && let Some(replacement) = rewrite(UntypedRef::Pointer(pointer), path)
    {
        *pointer = replacement;
    }

    for keyword in SINGLE_KEYWORDS {
        if let Some(child) = map.get_mut(keyword) {
            rewrite_at(child, &format!("{path}.{keyword}"), depth + 1, rewrite);
        }
    }

    for keyword in LIST_KEYWORDS {
        if let Some(Value::Array(items)) = map.get_mut(keyword) {
            for (i, item) in items.iter_mut().enumerate() {
                rewrite_at(item, &format!("{path}.{keyword}[{i}]"), depth + 1, rewrite);
            }
        }
    }

    for keyword in MAP_KEYWORDS {
        if let Some(Value::Object(entries)) = map.get_mut(keyword) {
            for (key, entry) in entries.iter_mut() {
                rewrite_at(entry, &format!("{path}.{keyword}.{key}"), depth + 1, rewrite);
            }
        }
    }

    if let Some(Value::Object(mapping)) = map
        .get_mut("discriminator")
        .and_then(|d| d.get_mut("mapping"))
    {
        for (key, target) in mapping.iter_mut() {
            if let Value::String(target) = target {
                let location = format!("{path}.discriminator.mapping.{key}");
                if let Some(replacement) = rewrite(UntypedRef::Mapping(target), &location) {
                    *target = replacement;
                }
            }
        }
    }
}
