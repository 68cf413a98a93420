//! Candidate and validated payload types

use crate::EventType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Token attached to every delivery so receivers can deduplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Text returned by the generative service for one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePayload {
    /// Exactly what the service returned
    pub raw: String,

    /// Text after the local repair pass (equal to `raw` when untouched)
    pub text: String,
}

impl CandidatePayload {
    /// Create a candidate that was not repaired
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            text: raw.clone(),
            raw,
        }
    }

    /// Create a candidate with repaired text
    pub fn repaired(raw: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            text: text.into(),
        }
    }

    /// Check whether the repair pass changed the text
    pub fn was_repaired(&self) -> bool {
        self.raw != self.text
    }
}

/// A payload that passed schema validation
///
/// Immutable once produced: the canonical serialization and its digest are
/// computed at construction and every accessor borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    correlation_id: CorrelationId,
    event_type: EventType,
    body: Map<String, Value>,
    canonical: String,
    digest: String,
    validated_at: DateTime<Utc>,
}

impl ValidatedPayload {
    pub(crate) fn new(
        event_type: EventType,
        body: Map<String, Value>,
        correlation_id: CorrelationId,
    ) -> Self {
        let canonical = canonicalize(&Value::Object(body.clone())).to_string();
        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));

        Self {
            correlation_id,
            event_type,
            body,
            canonical,
            digest,
            validated_at: Utc::now(),
        }
    }

    /// Correlation identifier used for idempotent delivery
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Event type the payload was validated against
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Parsed payload fields
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Get a single top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Payload as an owned JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }

    /// Canonical serialization: compact JSON with keys sorted at every level
    pub fn canonical_json(&self) -> &str {
        &self.canonical
    }

    /// Canonical serialization as bytes
    pub fn canonical_bytes(&self) -> &[u8] {
        self.canonical.as_bytes()
    }

    /// Hex-encoded SHA-256 of the canonical serialization
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// When validation succeeded
    pub fn validated_at(&self) -> DateTime<Utc> {
        self.validated_at
    }
}

/// Rebuild a value with object keys in sorted order
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let payload = ValidatedPayload::new(
            EventType::cash_in(),
            body(json!({"b": 1, "a": {"z": true, "y": [ {"d": 1, "c": 2} ]}})),
            CorrelationId::new(),
        );

        assert_eq!(
            payload.canonical_json(),
            r#"{"a":{"y":[{"c":2,"d":1}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_digest_is_stable() {
        let a = ValidatedPayload::new(
            EventType::cash_in(),
            body(json!({"x": 1, "y": 2})),
            CorrelationId::new(),
        );
        let b = ValidatedPayload::new(
            EventType::cash_in(),
            body(json!({"y": 2, "x": 1})),
            CorrelationId::new(),
        );

        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
        assert_ne!(a.correlation_id(), b.correlation_id());
    }

    #[test]
    fn test_candidate_repair_flag() {
        assert!(!CandidatePayload::new("{}").was_repaired());
        assert!(CandidatePayload::repaired("```json\n{}\n```", "{}").was_repaired());
    }

    #[test]
    fn test_correlation_id_display_matches_uuid() {
        let id = CorrelationId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
        assert_eq!(serde_json::to_value(id).unwrap(), json!(id.to_string()));
    }
}
