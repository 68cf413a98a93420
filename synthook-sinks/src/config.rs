//! Sink configuration

use crate::{RetryPolicy, SinkConfigError};
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Name a sink is addressed by in requests
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SinkId(String);

impl SinkId {
    /// Create a sink id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SinkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SinkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Headers the HTTP sink sets itself; configuration may not override them
const RESERVED_HEADERS: [&str; 4] = [
    "content-type",
    "x-correlation-id",
    "x-event-type",
    "x-payload-digest",
];

/// Transport a sink delivers over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// `POST` to a webhook URL
    Http,
    /// Publish to a pub/sub topic
    Pubsub,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Pubsub => f.write_str("pubsub"),
        }
    }
}

/// Configuration of one delivery target
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Unique sink name
    pub id: SinkId,

    /// Transport
    pub kind: SinkKind,

    /// Webhook URL or topic identifier
    pub address: String,

    /// Budget for a single attempt
    pub timeout: Duration,

    /// Retry policy across attempts
    pub retry: RetryPolicy,

    /// Extra HTTP headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Message subject for pub/sub topics that support one
    pub subject: Option<String>,
}

impl SinkConfig {
    /// Create a configuration with default timeout and retry policy
    pub fn new(id: impl Into<SinkId>, kind: SinkKind, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            address: address.into(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            headers: BTreeMap::new(),
            subject: None,
        }
    }

    /// HTTP sink posting to `url`
    pub fn http(id: impl Into<SinkId>, url: impl Into<String>) -> Self {
        Self::new(id, SinkKind::Http, url)
    }

    /// Pub/sub sink publishing to `topic`
    pub fn pubsub(id: impl Into<SinkId>, topic: impl Into<String>) -> Self {
        Self::new(id, SinkKind::Pubsub, topic)
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Add an HTTP header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the pub/sub subject
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), SinkConfigError> {
        let fail = |reason: String| SinkConfigError {
            sink_id: self.id.to_string(),
            reason,
        };

        if self.id.as_str().trim().is_empty() {
            return Err(fail("sink id must not be empty".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(fail("address must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(fail("timeout must be greater than zero".to_string()));
        }
        if let Some(problem) = self.retry.problem() {
            return Err(fail(problem.to_string()));
        }

        if self.kind == SinkKind::Http {
            let url = url::Url::parse(&self.address)
                .map_err(|e| fail(format!("invalid URL '{}': {e}", self.address)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(fail(format!("unsupported URL scheme '{}'", url.scheme())));
            }
        }

        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| fail(format!("invalid header name '{name}'")))?;
            if RESERVED_HEADERS.contains(&header.as_str()) {
                return Err(fail(format!("header '{name}' is set by the sink")));
            }
            HeaderValue::from_str(value)
                .map_err(|_| fail(format!("invalid value for header '{name}'")))?;
        }

        Ok(())
    }
}
