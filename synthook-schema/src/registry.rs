//! Registry of event type schemas

use crate::{
    CorrelationId, EventType, InferenceError, Result, Schema, ValidatedPayload, ValidationError,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    schema: Schema,
    keywords: Vec<String>,
}

/// Schemas and scenario keywords for every registered event type
///
/// Built once at startup and shared read-only; validation never mutates it.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<EventType, Entry>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `cash-in` and `cash-out` types
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(EventType::cash_in(), Schema::cash_in());
        registry.register_keywords(&EventType::cash_in(), ["deposit", "incoming"]);
        registry.register(EventType::cash_out(), Schema::cash_out());
        registry.register_keywords(&EventType::cash_out(), ["withdrawal", "payout", "outgoing"]);
        registry
    }

    /// Register (or replace) the schema for an event type
    ///
    /// The event type's own name is always a keyword for inference.
    pub fn register(&mut self, event_type: EventType, schema: Schema) -> Option<Schema> {
        debug!(event_type = %event_type, fields = schema.fields.len(), "Registering schema");

        let keywords = event_type.name_keywords();
        match self.entries.get_mut(&event_type) {
            Some(entry) => Some(std::mem::replace(&mut entry.schema, schema)),
            None => {
                self.entries.insert(event_type, Entry { schema, keywords });
                None
            }
        }
    }

    /// Add scenario keywords for a registered event type
    ///
    /// Returns `false` if the type is not registered.
    pub fn register_keywords<I, S>(&mut self, event_type: &EventType, keywords: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(entry) = self.entries.get_mut(event_type) else {
            return false;
        };

        for keyword in keywords {
            let keyword = normalize(keyword.as_ref());
            if !keyword.is_empty() && !entry.keywords.contains(&keyword) {
                entry.keywords.push(keyword);
            }
        }
        true
    }

    /// Get the schema for an event type
    pub fn schema(&self, event_type: &EventType) -> Option<&Schema> {
        self.entries.get(event_type).map(|e| &e.schema)
    }

    /// Check whether an event type is registered
    pub fn contains(&self, event_type: &EventType) -> bool {
        self.entries.contains_key(event_type)
    }

    /// Registered event types, in name order
    pub fn event_types(&self) -> impl Iterator<Item = &EventType> {
        self.entries.keys()
    }

    /// Keywords used to infer an event type from scenario text
    pub fn keywords(&self, event_type: &EventType) -> &[String] {
        self.entries
            .get(event_type)
            .map(|e| e.keywords.as_slice())
            .unwrap_or_default()
    }

    /// Number of registered event types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no event type is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse and validate raw text, stamping a fresh correlation identifier
    pub fn validate(&self, event_type: &EventType, raw_text: &str) -> Result<ValidatedPayload> {
        self.validate_as(event_type, raw_text, CorrelationId::new())
    }

    /// Parse and validate raw text, stamping the given correlation identifier
    pub fn validate_as(
        &self,
        event_type: &EventType,
        raw_text: &str,
        correlation_id: CorrelationId,
    ) -> Result<ValidatedPayload> {
        let schema = self.require(event_type)?;
        let value: Value = serde_json::from_str(raw_text.trim())?;

        let Value::Object(body) = value else {
            return Err(ValidationError::Malformed {
                reason: format!("expected a JSON object, got {}", json_type(&value)),
            });
        };

        schema.check(&body)?;
        Ok(ValidatedPayload::new(event_type.clone(), body, correlation_id))
    }

    /// Validate an already-parsed value without producing a payload
    pub fn validate_value(&self, event_type: &EventType, value: &Value) -> Result<()> {
        let schema = self.require(event_type)?;
        match value {
            Value::Object(body) => schema.check(body),
            other => Err(ValidationError::Malformed {
                reason: format!("expected a JSON object, got {}", json_type(other)),
            }),
        }
    }

    /// Resolve the event type a scenario talks about
    ///
    /// Matches whole-word keywords against the normalized scenario text.
    /// Zero matches or more than one matching type is an error; the
    /// registry never guesses.
    pub fn infer(&self, scenario: &str) -> std::result::Result<EventType, InferenceError> {
        let haystack = format!(" {} ", normalize(scenario));

        let mut candidates: Vec<EventType> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry
                    .keywords
                    .iter()
                    .any(|kw| haystack.contains(&format!(" {} ", normalize(kw))))
            })
            .map(|(event_type, _)| event_type.clone())
            .collect();

        match candidates.len() {
            0 => Err(InferenceError::NoMatch),
            1 => Ok(candidates.remove(0)),
            _ => Err(InferenceError::Ambiguous { candidates }),
        }
    }

    fn require(&self, event_type: &EventType) -> Result<&Schema> {
        self.schema(event_type)
            .ok_or_else(|| ValidationError::UnknownEventType {
                event_type: event_type.clone(),
            })
    }
}

/// Lowercase, punctuation to spaces, whitespace collapsed
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldKind;

    const CASH_IN: &str = r#"{"id":"123","type":"cashin","amount":1000,"currency":"BRL","status":"confirmed","createdAt":"2025-08-27T12:00:00Z"}"#;

    #[test]
    fn test_builtin_types() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&EventType::cash_in()));
        assert!(registry.contains(&EventType::cash_out()));
    }

    #[test]
    fn test_validate_success() {
        let registry = SchemaRegistry::builtin();
        let payload = registry.validate(&EventType::cash_in(), CASH_IN).unwrap();

        assert_eq!(payload.event_type(), &EventType::cash_in());
        assert_eq!(payload.get("currency"), Some(&serde_json::json!("BRL")));
    }

    #[test]
    fn test_validate_as_keeps_correlation_id() {
        let registry = SchemaRegistry::builtin();
        let id = CorrelationId::new();
        let payload = registry
            .validate_as(&EventType::cash_in(), CASH_IN, id)
            .unwrap();

        assert_eq!(payload.correlation_id(), id);
    }

    #[test]
    fn test_validate_malformed() {
        let registry = SchemaRegistry::builtin();

        let err = registry
            .validate(&EventType::cash_in(), "Here is your webhook!")
            .unwrap_err();
        assert_eq!(err.kind(), "malformed");

        let err = registry
            .validate(&EventType::cash_in(), "[1, 2, 3]")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { ref reason } if reason.contains("array")));
    }

    #[test]
    fn test_validate_unknown_type() {
        let registry = SchemaRegistry::builtin();
        let err = registry
            .validate(&EventType::new("refund"), CASH_IN)
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnknownEventType {
                event_type: EventType::new("refund")
            }
        );
    }

    #[test]
    fn test_register_replaces_schema() {
        let mut registry = SchemaRegistry::new();
        assert!(
            registry
                .register(EventType::new("ping"), Schema::new())
                .is_none()
        );

        let previous = registry.register(
            EventType::new("ping"),
            Schema::new().required("id", FieldKind::String),
        );
        assert_eq!(previous, Some(Schema::new()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_infer_by_keyword() {
        let registry = SchemaRegistry::builtin();

        assert_eq!(
            registry.infer("cash-in of 1000 BRL, confirmed").unwrap(),
            EventType::cash_in()
        );
        assert_eq!(
            registry.infer("Simule um webhook de Pix Cash Out de R$ 250").unwrap(),
            EventType::cash_out()
        );
        assert_eq!(
            registry.infer("A pending DEPOSIT of 75 BRL").unwrap(),
            EventType::cash_in()
        );
    }

    #[test]
    fn test_direction_neutral_verbs_do_not_decide() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(
            registry.infer("cash-in of 100 BRL sent by Maria").unwrap(),
            EventType::cash_in()
        );
        assert_eq!(
            registry.infer("cash-out received by the merchant").unwrap(),
            EventType::cash_out()
        );
    }

    #[test]
    fn test_infer_no_match() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(
            registry.infer("a chargeback dispute"),
            Err(InferenceError::NoMatch)
        );
        // Keywords match whole words only
        assert_eq!(
            registry.infer("cashing a cheque"),
            Err(InferenceError::NoMatch)
        );
    }

    #[test]
    fn test_infer_ambiguous() {
        let registry = SchemaRegistry::builtin();
        let err = registry
            .infer("a cash in followed by a cash out")
            .unwrap_err();

        assert_eq!(
            err,
            InferenceError::Ambiguous {
                candidates: vec![EventType::cash_in(), EventType::cash_out()]
            }
        );
    }

    #[test]
    fn test_register_keywords_unknown_type() {
        let mut registry = SchemaRegistry::new();
        assert!(!registry.register_keywords(&EventType::new("x"), ["y"]));
    }
}
