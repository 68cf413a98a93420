//! Delivery Sinks for Synthook
//!
//! A sink takes a validated payload to one destination: an HTTP webhook
//! receiver or a pub/sub topic. Every sink shares the same retry driver,
//! so backoff, per-attempt timeouts and request deadlines behave the same
//! on every transport.
//!
//! # Features
//!
//! - **HTTP Sink**: `POST` of the canonical JSON with correlation headers
//! - **Pub/Sub Sink**: Publishes through any [`Publisher`]
//! - **AWS SNS**: [`SnsPublisher`] behind the `aws` feature
//! - **Retries**: Exponential backoff with jitter, 5xx and transport errors only
//! - **Deadlines**: Delivery stops with `Canceled` when the request deadline passes
//!
//! # Example
//!
//! ```rust,no_run
//! use synthook_schema::{EventType, SchemaRegistry};
//! use synthook_sinks::{HttpSink, Sink, SinkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SchemaRegistry::builtin();
//!     let payload = registry.validate(
//!         &EventType::cash_in(),
//!         r#"{"id":"123","type":"cashin","amount":1000,"currency":"BRL",
//!             "status":"confirmed","createdAt":"2025-08-27T12:00:00Z"}"#,
//!     )?;
//!
//!     let config = SinkConfig::http("local", "http://localhost:8080/webhook");
//!     let sink = HttpSink::new("Synthook/0.1")?;
//!
//!     let outcome = sink.deliver(&payload, &config).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#[cfg(feature = "aws")]
mod aws;
mod config;
mod error;
mod http;
mod outcome;
mod pubsub;
mod retry;
mod sink;

#[cfg(feature = "aws")]
pub use aws::{SnsPublisher, SnsSettings};
pub use config::{SinkConfig, SinkId, SinkKind};
pub use error::{DeliveryError, SinkConfigError};
pub use http::{CORRELATION_ID_HEADER, EVENT_TYPE_HEADER, HttpSink, PAYLOAD_DIGEST_HEADER};
pub use outcome::DeliveryOutcome;
pub use pubsub::{
    CORRELATION_ID_ATTRIBUTE, EVENT_TYPE_ATTRIBUTE, MemoryPublisher, PubSubSink,
    PublishRequest, PublishedMessage, Publisher,
};
pub use retry::RetryPolicy;
pub use sink::{Sink, until};
