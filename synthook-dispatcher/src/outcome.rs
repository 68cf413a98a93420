//! Terminal result of a simulation request

use crate::{RequestError, SimulationState};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use synthook_generator::GenerationError;
use synthook_schema::{CorrelationId, EventType, ValidationError};
use synthook_sinks::DeliveryError;

/// `succeeded` or `failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    Succeeded,
    Failed,
}

/// Stage a request failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Received,
    Generating,
    Validating,
    Delivering,
}

/// Typed error behind a failure
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    Request(RequestError),
    Generation(GenerationError),
    Validation(ValidationError),
    Delivery(DeliveryError),
    /// The request deadline elapsed before delivery started
    Canceled,
}

impl FailureCause {
    /// Stable snake_case error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(e) => e.kind(),
            Self::Generation(e) => e.kind(),
            Self::Validation(e) => e.kind(),
            Self::Delivery(e) => e.kind(),
            Self::Canceled => "canceled",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Self::Request(e) => e.to_string(),
            Self::Generation(e) => e.to_string(),
            Self::Validation(e) => e.to_string(),
            Self::Delivery(e) => e.to_string(),
            Self::Canceled => "request deadline elapsed".to_string(),
        }
    }
}

/// Failure description returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub stage: FailureStage,
    pub kind: String,
    pub message: String,

    /// Raw generator text, present when validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    /// Delivery attempts made, present for delivery failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    #[serde(skip)]
    pub cause: FailureCause,
}

impl ErrorDetail {
    /// Build the detail for a cause
    pub fn new(stage: FailureStage, cause: FailureCause) -> Self {
        Self {
            stage,
            kind: cause.kind().to_string(),
            message: cause.message(),
            raw_text: None,
            attempts: None,
            cause,
        }
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

/// Acknowledgment from the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
    pub attempts: u32,
    pub latency: Duration,
}

/// Result of one `simulate` call
///
/// Serializes to `{status, correlationId, payload?, errorDetail?}`; the
/// remaining fields are for in-process callers only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub status: SimulationStatus,
    pub correlation_id: CorrelationId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,

    /// Event type the request resolved to
    #[serde(skip)]
    pub event_type: Option<EventType>,

    /// Sink acknowledgment on success
    #[serde(skip)]
    pub delivery: Option<DeliveryReceipt>,

    /// Every state the request passed through, in order
    #[serde(skip)]
    pub states: Vec<SimulationState>,
}

impl SimulationOutcome {
    /// Check if the payload was delivered
    pub fn is_success(&self) -> bool {
        self.status == SimulationStatus::Succeeded
    }

    /// Typed cause of a failure
    pub fn cause(&self) -> Option<&FailureCause> {
        self.error_detail.as_ref().map(|d| &d.cause)
    }

    /// Number of generation rounds that ran
    pub fn generations(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == SimulationState::Generating)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let id = CorrelationId::new();
        let outcome = SimulationOutcome {
            status: SimulationStatus::Succeeded,
            correlation_id: id,
            payload: Some(json!({"id": "123"})),
            error_detail: None,
            event_type: Some(EventType::cash_in()),
            delivery: None,
            states: vec![SimulationState::Received, SimulationState::Succeeded],
        };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "status": "succeeded",
                "correlationId": id.to_string(),
                "payload": {"id": "123"}
            })
        );
    }

    #[test]
    fn test_failure_shape() {
        let id = CorrelationId::new();
        let detail = ErrorDetail::new(
            FailureStage::Validating,
            FailureCause::Validation(ValidationError::Malformed {
                reason: "expected value".to_string(),
            }),
        )
        .with_raw_text("not json");

        let outcome = SimulationOutcome {
            status: SimulationStatus::Failed,
            correlation_id: id,
            payload: None,
            error_detail: Some(detail),
            event_type: None,
            delivery: None,
            states: Vec::new(),
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["errorDetail"]["stage"], "validating");
        assert_eq!(value["errorDetail"]["kind"], "malformed");
        assert_eq!(value["errorDetail"]["rawText"], "not json");
        assert!(value["errorDetail"].get("attempts").is_none());
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn test_cause_kinds() {
        assert_eq!(FailureCause::Canceled.kind(), "canceled");
        assert_eq!(
            FailureCause::Delivery(DeliveryError::transport("x")).kind(),
            "transport_failure"
        );
        assert_eq!(
            FailureCause::Generation(GenerationError::EmptyResponse).kind(),
            "empty_response"
        );
    }
}
