//! Event Schemas for Synthook
//!
//! This crate defines the vocabulary shared by every stage of the
//! simulation pipeline: event types, payload schemas, the schema registry
//! that gates generated output, and the curated example sets used to
//! ground the generator.
//!
//! # Features
//!
//! - **Event Types**: Configurable tags such as `cash-in` and `cash-out`
//! - **Schema Registry**: Required fields, field types and value domains
//! - **Minor Units**: Amounts are integers; fractional numbers are rejected
//! - **Example Store**: Deterministic, ordered reference payloads
//! - **Validated Payloads**: Immutable, canonically serialized, correlated
//!
//! # Example
//!
//! ```rust
//! use synthook_schema::{EventType, SchemaRegistry};
//!
//! let registry = SchemaRegistry::builtin();
//! let raw = r#"{"id":"123","type":"cashin","amount":1000,"currency":"BRL",
//!              "status":"confirmed","createdAt":"2025-08-27T12:00:00Z"}"#;
//!
//! let payload = registry.validate(&EventType::cash_in(), raw).unwrap();
//! assert_eq!(payload.get("amount"), Some(&serde_json::json!(1000)));
//! ```

mod error;
mod event_type;
mod examples;
mod payload;
mod registry;
mod schema;

pub use error::{ExampleStoreError, InferenceError, ValidationError};
pub use event_type::EventType;
pub use examples::{ExampleEvent, ExampleStore, Examples};
pub use payload::{CandidatePayload, CorrelationId, ValidatedPayload};
pub use registry::SchemaRegistry;
pub use schema::{FieldKind, FieldSpec, Schema};

/// Result type for payload validation
pub type Result<T> = std::result::Result<T, ValidationError>;
