//! HTTP webhook sink

use crate::{DeliveryError, Sink, SinkConfig, SinkKind};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use synthook_schema::ValidatedPayload;
use tracing::debug;
use uuid::Uuid;

/// Header carrying the request's correlation identifier
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";
/// Header carrying the event type name
pub const EVENT_TYPE_HEADER: &str = "X-Event-Type";
/// Header carrying the SHA-256 of the body
pub const PAYLOAD_DIGEST_HEADER: &str = "X-Payload-Digest";

/// Response headers a receiver may use to name the delivery
const DELIVERY_ID_HEADERS: [&str; 2] = ["x-delivery-id", "x-request-id"];

/// Longest slice of an error body kept in errors
const ERROR_BODY_LIMIT: usize = 512;

/// Sink that `POST`s the canonical payload to a webhook URL
#[derive(Debug, Clone)]
pub struct HttpSink {
    http_client: Client,
}

impl HttpSink {
    /// Create a sink sending the given User-Agent
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http_client })
    }

    /// Create a sink around an existing client
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Sink for HttpSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Http
    }

    async fn send_once(
        &self,
        payload: &ValidatedPayload,
        config: &SinkConfig,
    ) -> Result<String, DeliveryError> {
        let mut request = self
            .http_client
            .post(&config.address)
            .timeout(config.timeout)
            .header("Content-Type", "application/json")
            .header(CORRELATION_ID_HEADER, payload.correlation_id().to_string())
            .header(EVENT_TYPE_HEADER, payload.event_type().as_str())
            .header(PAYLOAD_DIGEST_HEADER, payload.digest());

        for (name, value) in &config.headers {
            request = request.header(name, value);
        }

        let response = request
            .body(payload.canonical_json().to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::timeout(config.timeout)
                } else if e.is_builder() {
                    DeliveryError::rejected(format!("invalid request: {e}"))
                } else {
                    DeliveryError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .ok()
                .filter(|b| !b.is_empty())
                .map(|b| b.chars().take(ERROR_BODY_LIMIT).collect());
            return Err(DeliveryError::NonSuccessStatus {
                status: status.as_u16(),
                body,
            });
        }

        let delivery_id = delivery_id_from(response.headers())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        debug!(
            sink_id = %config.id,
            status = status.as_u16(),
            delivery_id = %delivery_id,
            "Receiver acknowledged payload"
        );
        Ok(delivery_id)
    }
}

fn delivery_id_from(headers: &HeaderMap) -> Option<String> {
    DELIVERY_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}
