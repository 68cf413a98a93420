//! Error types for schema validation and example loading

use crate::EventType;
use serde::Serialize;
use thiserror::Error;

/// Reasons a candidate payload is refused by the schema registry
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// The text is not JSON, or not a JSON object
    #[error("Malformed payload: {reason}")]
    Malformed { reason: String },

    /// A declared field is missing or does not match its declaration
    #[error("Field `{field}` expected {expected}, got {actual}")]
    SchemaMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// No schema is registered for the event type
    #[error("Event type not registered: {event_type}")]
    UnknownEventType { event_type: EventType },
}

impl ValidationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ValidationError::Malformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::SchemaMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Malformed { .. } => "malformed",
            ValidationError::SchemaMismatch { .. } => "schema_mismatch",
            ValidationError::UnknownEventType { .. } => "unknown_event_type",
        }
    }

    /// Whether asking the generator again could plausibly fix the payload
    pub fn is_regenerable(&self) -> bool {
        matches!(
            self,
            ValidationError::Malformed { .. } | ValidationError::SchemaMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::malformed(err.to_string())
    }
}

/// Failure to resolve an event type from scenario text
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InferenceError {
    /// No registered event type matched any keyword
    #[error("No registered event type matches the scenario")]
    NoMatch,

    /// More than one event type matched
    #[error("Scenario matches several event types: {}", join(candidates))]
    Ambiguous { candidates: Vec<EventType> },
}

fn join(types: &[EventType]) -> String {
    types
        .iter()
        .map(EventType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while building or checking the example store
#[derive(Error, Debug)]
pub enum ExampleStoreError {
    /// Example file could not be read
    #[error("Failed to read examples from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Example file is not a JSON array of payloads
    #[error("Failed to parse examples from {path}: {reason}")]
    Parse { path: String, reason: String },

    /// Registered event types without any example
    #[error("No examples for event types: {}", join(event_types))]
    MissingExamples { event_types: Vec<EventType> },

    /// A reference payload does not satisfy its own schema
    #[error("Example #{index} for {event_type} is invalid: {source}")]
    InvalidExample {
        event_type: EventType,
        index: usize,
        #[source]
        source: ValidationError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_kinds() {
        assert_eq!(ValidationError::malformed("x").kind(), "malformed");
        assert_eq!(
            ValidationError::mismatch("amount", "integer", "string").kind(),
            "schema_mismatch"
        );
        assert!(ValidationError::malformed("x").is_regenerable());
        assert!(
            !ValidationError::UnknownEventType {
                event_type: EventType::new("pix")
            }
            .is_regenerable()
        );
    }

    #[test]
    fn test_validation_error_serializes_with_kind_tag() {
        let err = ValidationError::mismatch("currency", "one of [BRL]", "string \"XYZ\"");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["kind"], "schema_mismatch");
        assert_eq!(json["field"], "currency");
    }

    #[test]
    fn test_missing_examples_message() {
        let err = ExampleStoreError::MissingExamples {
            event_types: vec![EventType::new("cash-in"), EventType::new("refund")],
        };
        assert_eq!(err.to_string(), "No examples for event types: cash-in, refund");
    }
}
