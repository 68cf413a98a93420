//! Integration tests for synthook-schema

use serde_json::{Value, json};
use synthook_schema::*;

fn mutations() -> Vec<Value> {
    let base = json!({
        "id": "123",
        "type": "cashin",
        "amount": 1000,
        "currency": "BRL",
        "status": "confirmed",
        "createdAt": "2025-08-27T12:00:00Z"
    });

    let mut out = Vec::new();
    for (field, bad) in [
        ("id", json!(123)),
        ("type", json!("refund")),
        ("amount", json!(12.34)),
        ("amount", json!("1000")),
        ("amount", json!(-5)),
        ("currency", json!("brl")),
        ("status", json!("done")),
        ("createdAt", json!("yesterday")),
        ("payer", json!([1])),
        ("endToEndId", json!(false)),
    ] {
        let mut payload = base.clone();
        payload[field] = bad;
        out.push(payload);
    }

    let mut missing = base.clone();
    missing.as_object_mut().unwrap().remove("status");
    out.push(missing);
    out
}

#[test]
fn test_every_registered_type_has_examples() {
    let registry = SchemaRegistry::builtin();
    let store = ExampleStore::builtin();

    for event_type in registry.event_types() {
        let first: Vec<_> = store.examples_for(event_type).cloned().collect();
        let again: Vec<_> = store.examples_for(event_type).cloned().collect();

        assert!(!first.is_empty(), "{event_type} has no examples");
        assert_eq!(first, again, "{event_type} examples are not deterministic");
    }
}

#[test]
fn test_validation_is_idempotent() {
    let registry = SchemaRegistry::builtin();
    let store = ExampleStore::builtin();

    for event_type in registry.event_types() {
        for example in store.examples_for(event_type) {
            let raw = example.payload.to_string();
            let first = registry.validate(event_type, &raw).unwrap();
            let second = registry.validate(event_type, first.canonical_json()).unwrap();

            assert_eq!(first.body(), second.body());
            assert_eq!(first.digest(), second.digest());
        }
    }
}

#[test]
fn test_mismatch_reports_declared_field() {
    let registry = SchemaRegistry::builtin();
    let event_type = EventType::cash_in();
    let schema = registry.schema(&event_type).unwrap();

    for payload in mutations() {
        let err = registry
            .validate(&event_type, &payload.to_string())
            .unwrap_err();

        match err {
            ValidationError::SchemaMismatch { field, .. } => {
                assert!(schema.declares(&field), "undeclared field {field}");
            }
            other => panic!("expected a schema mismatch, got {other:?}"),
        }
    }
}

#[test]
fn test_extra_fields_are_tolerated() {
    let registry = SchemaRegistry::builtin();
    let raw = r#"{"id":"1","type":"cashout","amount":1,"currency":"USD","status":"refunded",
                  "createdAt":"2025-08-27T12:00:00-03:00","merchantRef":"abc"}"#;

    let payload = registry.validate(&EventType::cash_out(), raw).unwrap();
    assert_eq!(payload.get("merchantRef"), Some(&json!("abc")));
}

#[test]
fn test_custom_schema_from_json() {
    let schema: Schema = serde_json::from_value(json!({
        "fields": [
            {"name": "id", "kind": "string"},
            {"name": "amount", "kind": "integer", "min": 1},
            {"name": "reason", "kind": "enum", "values": ["fraud", "duplicate"]},
            {"name": "note", "kind": "string", "required": false}
        ]
    }))
    .unwrap();

    let mut registry = SchemaRegistry::new();
    registry.register(EventType::new("Refund"), schema);
    registry.register_keywords(&EventType::new("refund"), ["chargeback"]);

    assert_eq!(
        registry.infer("simulate a chargeback of 10 BRL").unwrap(),
        EventType::new("refund")
    );

    let ok = registry.validate(
        &EventType::new("refund"),
        r#"{"id":"r1","amount":10,"reason":"fraud"}"#,
    );
    assert!(ok.is_ok());

    let err = registry
        .validate(
            &EventType::new("refund"),
            r#"{"id":"r1","amount":10,"reason":"other"}"#,
        )
        .unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}
