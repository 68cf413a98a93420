//! Error types for payload generation

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a [`PayloadGenerator`](crate::PayloadGenerator)
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationError {
    /// The service could not be reached or answered with an error
    #[error("Generative service unavailable: {message}")]
    ServiceUnavailable {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },

    /// The service answered without any usable content
    #[error("Generative service returned an empty response")]
    EmptyResponse,

    /// The call did not finish in time
    #[error("Generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl GenerationError {
    /// Stable snake_case name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::EmptyResponse => "empty_response",
            Self::Timeout { .. } => "timeout",
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            status: None,
        }
    }

    pub(crate) fn timeout(timeout: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::ServiceUnavailable {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}
