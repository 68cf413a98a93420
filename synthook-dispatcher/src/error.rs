//! Error types for the dispatcher

use serde::Serialize;
use synthook_schema::{EventType, ExampleStoreError, InferenceError};
use synthook_sinks::{SinkConfigError, SinkId, SinkKind};
use thiserror::Error;

/// A request that cannot be processed as given
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestError {
    /// No sink is configured under this id
    #[error("Unknown sink: {sink_id}")]
    UnknownSink { sink_id: SinkId },

    /// The event type hint names a type without a schema
    #[error("Event type '{event_type}' is not registered")]
    UnregisteredEventType { event_type: EventType },

    /// No hint was given and the scenario does not name exactly one type
    #[error("Could not infer event type: {source}")]
    EventTypeNotInferred { source: InferenceError },
}

impl RequestError {
    /// Stable snake_case name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownSink { .. } => "unknown_sink",
            Self::UnregisteredEventType { .. } => "unregistered_event_type",
            Self::EventTypeNotInferred { .. } => "event_type_not_inferred",
        }
    }
}

/// Reasons a dispatcher cannot be built
#[derive(Error, Debug)]
pub enum BuildError {
    /// Example store does not cover the registry, or an example is invalid
    #[error(transparent)]
    Examples(#[from] ExampleStoreError),

    /// A sink configuration is unusable
    #[error(transparent)]
    InvalidSink(#[from] SinkConfigError),

    /// Two sinks share an id
    #[error("Duplicate sink id: {sink_id}")]
    DuplicateSink { sink_id: SinkId },

    /// A sink implementation does not speak the configured transport
    #[error("Sink '{sink_id}' is configured as {configured} but the implementation is {actual}")]
    SinkKindMismatch {
        sink_id: SinkId,
        configured: SinkKind,
        actual: SinkKind,
    },

    /// No payload generator was supplied
    #[error("No payload generator configured")]
    MissingGenerator,

    /// No schema is registered
    #[error("Schema registry is empty")]
    EmptyRegistry,

    /// A dispatch setting is out of range
    #[error("Invalid dispatch setting: {0}")]
    InvalidSetting(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_kind_and_serde() {
        let err = RequestError::UnknownSink {
            sink_id: SinkId::new("nowhere"),
        };
        assert_eq!(err.kind(), "unknown_sink");
        assert_eq!(err.to_string(), "Unknown sink: nowhere");

        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["kind"], "unknown_sink");
        assert_eq!(value["sink_id"], "nowhere");
    }

    #[test]
    fn test_not_inferred_message() {
        let err = RequestError::EventTypeNotInferred {
            source: InferenceError::NoMatch,
        };
        assert_eq!(err.kind(), "event_type_not_inferred");
        assert!(err.to_string().starts_with("Could not infer event type"));
    }
}
