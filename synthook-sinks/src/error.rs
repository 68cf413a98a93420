//! Error types for sink delivery

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Why one delivery attempt, or a whole delivery, failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryError {
    /// The request never got a response
    #[error("Transport failure: {message}")]
    TransportFailure { message: String },

    /// The receiver answered with a non-2xx status
    #[error("Receiver returned HTTP {status}")]
    NonSuccessStatus {
        status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },

    /// The attempt exceeded the sink timeout
    #[error("Delivery attempt timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The request deadline elapsed before delivery finished
    #[error("Delivery canceled: request deadline elapsed")]
    Canceled,

    /// The broker refused the message permanently
    #[error("Message rejected: {reason}")]
    Rejected { reason: String },
}

impl DeliveryError {
    /// Stable snake_case name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TransportFailure { .. } => "transport_failure",
            Self::NonSuccessStatus { .. } => "non_success_status",
            Self::Timeout { .. } => "timeout",
            Self::Canceled => "canceled",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// Check if another attempt may succeed
    ///
    /// Only transport failures, timeouts and 5xx answers are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportFailure { .. } | Self::Timeout { .. } => true,
            Self::NonSuccessStatus { status, .. } => (500..600).contains(status),
            Self::Canceled | Self::Rejected { .. } => false,
        }
    }

    /// Create a transport failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: message.into(),
        }
    }

    /// Create a rejection
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub(crate) fn timeout(timeout: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// A sink configuration that cannot be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid configuration for sink '{sink_id}': {reason}")]
pub struct SinkConfigError {
    pub sink_id: String,
    pub reason: String,
}
