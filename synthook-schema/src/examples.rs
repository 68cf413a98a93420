//! Curated reference payloads used to ground the generator

use crate::{EventType, ExampleStoreError, SchemaRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A known-good payload for one event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleEvent {
    /// Event type the example belongs to
    pub event_type: EventType,

    /// The reference payload
    pub payload: Value,

    /// Optional note describing what the example illustrates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExampleEvent {
    /// Create an example without a description
    pub fn new(event_type: EventType, payload: Value) -> Self {
        Self {
            event_type,
            payload,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered iterator over the examples of one event type
pub type Examples<'a> = std::slice::Iter<'a, ExampleEvent>;

/// Example sets keyed by event type
///
/// Read-only once the dispatcher is built. Every call to
/// [`ExampleStore::examples_for`] yields the same sequence in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExampleStore {
    sets: BTreeMap<EventType, Vec<ExampleEvent>>,
}

impl ExampleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the built-in `cash-in` and `cash-out` examples
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for example in builtin_examples() {
            store.insert(example);
        }
        store
    }

    /// Append one example to its event type's sequence
    pub fn insert(&mut self, example: ExampleEvent) {
        self.sets
            .entry(example.event_type.clone())
            .or_default()
            .push(example);
    }

    /// Append several payloads for one event type
    pub fn extend<I>(&mut self, event_type: &EventType, payloads: I)
    where
        I: IntoIterator<Item = Value>,
    {
        for payload in payloads {
            self.insert(ExampleEvent::new(event_type.clone(), payload));
        }
    }

    /// Load examples for an event type from a JSON file
    ///
    /// The file holds either an array of payloads or an object with an
    /// `examples` array. Returns the number of examples added.
    pub fn load_file(
        &mut self,
        event_type: &EventType,
        path: impl AsRef<Path>,
    ) -> Result<usize, ExampleStoreError> {
        let path = path.as_ref();
        let location = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| ExampleStoreError::Io {
            path: location.clone(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|e| ExampleStoreError::Parse {
                path: location.clone(),
                reason: e.to_string(),
            })?;

        let payloads = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("examples") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ExampleStoreError::Parse {
                        path: location,
                        reason: "expected an `examples` array".to_string(),
                    });
                }
            },
            _ => {
                return Err(ExampleStoreError::Parse {
                    path: location,
                    reason: "expected a JSON array of payloads".to_string(),
                });
            }
        };

        let count = payloads.len();
        self.extend(event_type, payloads);
        debug!(event_type = %event_type, count, path = %location, "Loaded examples");
        Ok(count)
    }

    /// Ordered examples for an event type (empty if none)
    pub fn examples_for(&self, event_type: &EventType) -> Examples<'_> {
        self.sets
            .get(event_type)
            .map(|set| set.as_slice())
            .unwrap_or_default()
            .iter()
    }

    /// Number of examples for an event type
    pub fn count(&self, event_type: &EventType) -> usize {
        self.sets.get(event_type).map_or(0, Vec::len)
    }

    /// Event types with at least one example
    pub fn event_types(&self) -> impl Iterator<Item = &EventType> {
        self.sets.keys()
    }

    /// Check that every registered event type has at least one example
    pub fn ensure_covers(&self, registry: &SchemaRegistry) -> Result<(), ExampleStoreError> {
        let missing: Vec<EventType> = registry
            .event_types()
            .filter(|event_type| self.count(event_type) == 0)
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExampleStoreError::MissingExamples {
                event_types: missing,
            })
        }
    }

    /// Check coverage and that every example satisfies its own schema
    pub fn verify(&self, registry: &SchemaRegistry) -> Result<(), ExampleStoreError> {
        self.ensure_covers(registry)?;

        for event_type in registry.event_types() {
            for (index, example) in self.examples_for(event_type).enumerate() {
                registry
                    .validate_value(event_type, &example.payload)
                    .map_err(|source| ExampleStoreError::InvalidExample {
                        event_type: event_type.clone(),
                        index,
                        source,
                    })?;
            }
        }

        info!(event_types = registry.len(), "Example store verified");
        Ok(())
    }
}

fn builtin_examples() -> Vec<ExampleEvent> {
    vec![
        ExampleEvent::new(
            EventType::cash_in(),
            json!({
                "id": "123",
                "type": "cashin",
                "amount": 1000,
                "currency": "BRL",
                "status": "confirmed",
                "createdAt": "2025-08-27T12:00:00Z"
            }),
        )
        .with_description("Minimal confirmed cash-in"),
        ExampleEvent::new(
            EventType::cash_in(),
            json!({
                "id": "evt_9f2c1a7b",
                "type": "cashin",
                "amount": 50000,
                "currency": "BRL",
                "status": "pending",
                "createdAt": "2025-08-27T12:05:31Z",
                "endToEndId": "E18236120202508271205s0a1b2c3d4e",
                "payer": {
                    "name": "Maria Souza",
                    "document": "***.456.789-**",
                    "bank": "18236120"
                }
            }),
        )
        .with_description("Pending cash-in with payer details"),
        ExampleEvent::new(
            EventType::cash_out(),
            json!({
                "id": "evt_41d7e0c2",
                "type": "cashout",
                "amount": 25000,
                "currency": "BRL",
                "status": "confirmed",
                "createdAt": "2025-08-27T13:10:00Z",
                "endToEndId": "E00000000202508271310a9b8c7d6e5f",
                "payee": {
                    "name": "Joao Lima",
                    "document": "***.123.456-**",
                    "bank": "00000000"
                }
            }),
        )
        .with_description("Confirmed cash-out with payee details"),
        ExampleEvent::new(
            EventType::cash_out(),
            json!({
                "id": "evt_41d7e0c3",
                "type": "cashout",
                "amount": 30000,
                "currency": "BRL",
                "status": "failed",
                "createdAt": "2025-08-27T13:12:44Z",
                "description": "Insufficient balance"
            }),
        )
        .with_description("Failed cash-out"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;

    #[test]
    fn test_builtin_store_covers_builtin_registry() {
        let store = ExampleStore::builtin();
        let registry = SchemaRegistry::builtin();

        assert!(store.verify(&registry).is_ok());
        assert_eq!(store.count(&EventType::cash_in()), 2);
        assert_eq!(store.count(&EventType::cash_out()), 2);
    }

    #[test]
    fn test_examples_are_deterministic() {
        let store = ExampleStore::builtin();

        let first: Vec<_> = store.examples_for(&EventType::cash_in()).collect();
        let second: Vec<_> = store.examples_for(&EventType::cash_in()).collect();

        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(first[0].payload["id"], "123");
    }

    #[test]
    fn test_unknown_type_yields_empty_sequence() {
        let store = ExampleStore::builtin();
        assert_eq!(store.examples_for(&EventType::new("refund")).count(), 0);
    }

    #[test]
    fn test_missing_examples_detected() {
        let mut registry = SchemaRegistry::builtin();
        registry.register(EventType::new("refund"), Schema::new());

        let err = ExampleStore::builtin().ensure_covers(&registry).unwrap_err();
        match err {
            ExampleStoreError::MissingExamples { event_types } => {
                assert_eq!(event_types, vec![EventType::new("refund")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_example_detected() {
        let registry = SchemaRegistry::builtin();
        let mut store = ExampleStore::builtin();
        store.extend(
            &EventType::cash_in(),
            [json!({"id": "x", "type": "cashin", "amount": 10.5})],
        );

        let err = store.verify(&registry).unwrap_err();
        assert!(matches!(
            err,
            ExampleStoreError::InvalidExample { index: 2, .. }
        ));
    }

    #[test]
    fn test_load_file_array_and_object() {
        let dir = tempfile::tempdir().unwrap();
        let array_path = dir.path().join("refund.json");
        std::fs::write(&array_path, r#"[{"id": "r1"}, {"id": "r2"}]"#).unwrap();
        let object_path = dir.path().join("refund-more.json");
        std::fs::write(&object_path, r#"{"examples": [{"id": "r3"}]}"#).unwrap();

        let mut store = ExampleStore::new();
        let refund = EventType::new("refund");
        assert_eq!(store.load_file(&refund, &array_path).unwrap(), 2);
        assert_eq!(store.load_file(&refund, &object_path).unwrap(), 1);

        let ids: Vec<_> = store
            .examples_for(&refund)
            .map(|e| e.payload["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_load_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let mut store = ExampleStore::new();
        let refund = EventType::new("refund");
        assert!(matches!(
            store.load_file(&refund, &path),
            Err(ExampleStoreError::Parse { .. })
        ));
        assert!(matches!(
            store.load_file(&refund, dir.path().join("missing.json")),
            Err(ExampleStoreError::Io { .. })
        ));
    }
}
