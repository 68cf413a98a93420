//! Pub/sub topic sink

use crate::{DeliveryError, Sink, SinkConfig, SinkKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use synthook_schema::ValidatedPayload;
use tracing::debug;
use uuid::Uuid;

/// Attribute carrying the correlation identifier
pub const CORRELATION_ID_ATTRIBUTE: &str = "correlation_id";
/// Attribute carrying the event type name
pub const EVENT_TYPE_ATTRIBUTE: &str = "event_type";

/// One message handed to a [`Publisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Topic identifier
    pub topic: String,
    /// Opaque message body
    pub message: String,
    /// Optional subject line
    pub subject: Option<String>,
    /// Message attributes, never the body
    pub attributes: BTreeMap<String, String>,
}

/// A broker client able to publish to a named topic
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one message, returning the broker's message id
    async fn publish(&self, request: PublishRequest) -> Result<String, DeliveryError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Sink that publishes the canonical payload through a [`Publisher`]
#[derive(Clone)]
pub struct PubSubSink {
    publisher: Arc<dyn Publisher>,
}

impl PubSubSink {
    /// Create a sink around a publisher
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Build the message for a payload
    pub fn request_for(payload: &ValidatedPayload, config: &SinkConfig) -> PublishRequest {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            CORRELATION_ID_ATTRIBUTE.to_string(),
            payload.correlation_id().to_string(),
        );
        attributes.insert(
            EVENT_TYPE_ATTRIBUTE.to_string(),
            payload.event_type().to_string(),
        );

        PublishRequest {
            topic: config.address.clone(),
            message: payload.canonical_json().to_string(),
            subject: config.subject.clone(),
            attributes,
        }
    }
}

impl std::fmt::Debug for PubSubSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubSink")
            .field("publisher", &self.publisher.name())
            .finish()
    }
}

#[async_trait]
impl Sink for PubSubSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Pubsub
    }

    async fn send_once(
        &self,
        payload: &ValidatedPayload,
        config: &SinkConfig,
    ) -> Result<String, DeliveryError> {
        let request = Self::request_for(payload, config);
        debug!(
            sink_id = %config.id,
            publisher = self.publisher.name(),
            topic = %request.topic,
            "Publishing payload"
        );
        self.publisher.publish(request).await
    }
}

/// A message recorded by [`MemoryPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Assigned message id
    pub message_id: String,
    /// What was published
    pub request: PublishRequest,
}

/// Publisher that keeps messages in memory
///
/// Failures queued with [`MemoryPublisher::fail_next`] are returned by the
/// next publish calls, one per call, before messages are accepted again.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failures: Mutex<VecDeque<DeliveryError>>,
    attempts: Mutex<u32>,
}

impl MemoryPublisher {
    /// Create an empty publisher
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error for the next publish call
    pub fn fail_next(&self, error: DeliveryError) {
        self.failures.lock().push_back(error);
    }

    /// Messages accepted so far
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.messages.lock().clone()
    }

    /// Messages accepted for one topic
    pub fn published_to(&self, topic: &str) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.request.topic == topic)
            .cloned()
            .collect()
    }

    /// Publish calls made, failed ones included
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<String, DeliveryError> {
        *self.attempts.lock() += 1;

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let message_id = Uuid::new_v4().to_string();
        self.messages.lock().push(PublishedMessage {
            message_id: message_id.clone(),
            request,
        });
        Ok(message_id)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
