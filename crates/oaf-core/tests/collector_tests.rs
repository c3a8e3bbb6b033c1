use std::collections::BTreeSet;

use oaf_core::parse;
use oaf_core::parse::spec::Variant;
use oaf_core::refs::{CollectScope, ComponentKind, RefCollector};

const ORDERS: &str = include_str!("fixtures/orders-3.1.yaml");
const PETSTORE: &str = include_str!("fixtures/petstore-2.0.yaml");
const SLOTS: &str = include_str!("fixtures/slot-coverage.yaml");

fn names(prefix: &str, count: usize) -> BTreeSet<String> {
    (1..=count).map(|i| format!("{prefix}{i:02}")).collect()
}

#[test]
fn every_typed_slot_is_collected() {
    let doc = parse::from_yaml(SLOTS).unwrap();
    let index = RefCollector::collect(&doc, CollectScope::Full);
    let found = index.names(ComponentKind::Schema, Variant::Modern);
    for name in names("T", 23) {
        assert!(found.contains(&name), "missing typed reference to {name}");
    }
    assert_eq!(
        index.locations("#/components/schemas/T10"),
        ["components.schemas.Typed.items"]
    );
    assert_eq!(
        index.locations("#/components/schemas/T22"),
        ["components.schemas.Typed.discriminator.mapping.bare"]
    );
}

#[test]
fn every_untyped_slot_is_collected() {
    let doc = parse::from_yaml(SLOTS).unwrap();
    let index = RefCollector::collect(&doc, CollectScope::Full);
    let found = index.names(ComponentKind::Schema, Variant::Modern);
    for name in names("U", 23) {
        assert!(found.contains(&name), "missing untyped reference to {name}");
    }
    assert_eq!(
        index.locations("#/components/schemas/U01"),
        ["components.schemas.Untyped.items.properties.p"]
    );
    assert_eq!(
        index.locations("#/components/schemas/U05"),
        ["components.schemas.Untyped.items.definitions.legacyLocal"]
    );
}

#[test]
fn entry_points_exclude_schema_bodies() {
    let doc = parse::from_yaml(SLOTS).unwrap();
    let index = RefCollector::collect(&doc, CollectScope::EntryPoints);
    let found = index.names(ComponentKind::Schema, Variant::Modern);
    assert_eq!(
        found,
        BTreeSet::from(["Typed".to_string(), "Untyped".to_string()])
    );
}

#[test]
fn modern_kinds_are_tagged_by_context() {
    let doc = parse::from_yaml(ORDERS).unwrap();
    let index = RefCollector::collect(&doc, CollectScope::Full);

    let pointers = |kind| index.pointers(kind).collect::<Vec<_>>();
    assert_eq!(
        pointers(ComponentKind::Parameter),
        vec!["#/components/parameters/PageSize"]
    );
    assert_eq!(
        pointers(ComponentKind::RequestBody),
        vec!["#/components/requestBodies/NewOrder"]
    );
    assert_eq!(
        pointers(ComponentKind::Response),
        vec!["#/components/responses/Created"]
    );

    // Literal pointer, full mapping value and bare mapping value.
    assert_eq!(index.locations("#/components/schemas/Box<Cat>").len(), 3);
    assert_eq!(
        index.locations("#/components/schemas/Event%3COrderStatus%3E"),
        ["paths./orders.post.callbacks.statusChanged.{$request.body#/callbackUrl}.post.requestBody.content.application/json.schema"]
    );
    assert_eq!(
        index.locations("#/components/schemas/Event<Shipment>"),
        ["webhooks.orderShipped.post.requestBody.content.application/json.schema"]
    );
    assert_eq!(
        index.locations("#/components/schemas/Url"),
        ["components.responses.Created.headers.Location.schema"]
    );

    let schemas = index.names(ComponentKind::Schema, Variant::Modern);
    assert!(schemas.contains("Event<OrderStatus>"));
    assert!(schemas.contains("com.acme.Customer"));
    assert!(!schemas.contains("Leftover"));
}

#[test]
fn legacy_kinds_use_flat_prefixes() {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    let index = RefCollector::collect(&doc, CollectScope::Full);
    assert_eq!(
        index.pointers(ComponentKind::Parameter).collect::<Vec<_>>(),
        vec!["#/parameters/limit"]
    );
    assert_eq!(
        index.pointers(ComponentKind::Response).collect::<Vec<_>>(),
        vec!["#/responses/Error"]
    );
    assert_eq!(
        index.names(ComponentKind::Schema, Variant::Legacy),
        ["ErrorModel", "List[Pet]", "Orphan", "Orphan2", "Pet", "Tag"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>()
    );
    assert_eq!(
        index.locations("#/definitions/ErrorModel"),
        ["responses.Error.schema"]
    );
}

#[test]
fn collecting_does_not_mutate() {
    let doc = parse::from_yaml(ORDERS).unwrap();
    let before = doc.clone();
    let _ = RefCollector::collect(&doc, CollectScope::Full);
    assert_eq!(doc, before);
}
