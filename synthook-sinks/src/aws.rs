//! AWS SNS publisher

use crate::{DeliveryError, PublishRequest, Publisher};
use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sns::config::http::HttpResponse;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::types::MessageAttributeValue;
use tracing::{debug, info};

/// Connection settings for SNS
#[derive(Debug, Clone, Default)]
pub struct SnsSettings {
    /// AWS region; the default provider chain decides when absent
    pub region: Option<String>,

    /// Custom endpoint, e.g. LocalStack
    pub endpoint_url: Option<String>,
}

/// Publisher for SNS topics, addressed by topic ARN
#[derive(Debug, Clone)]
pub struct SnsPublisher {
    client: SnsClient,
}

impl SnsPublisher {
    /// Load AWS configuration and create a publisher
    pub async fn connect(settings: &SnsSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(aws_sdk_sns::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;
        info!(region = ?aws_config.region(), "SNS publisher ready");

        Self {
            client: SnsClient::new(&aws_config),
        }
    }

    /// Create a publisher around an existing client
    pub fn from_client(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<String, DeliveryError> {
        let mut call = self
            .client
            .publish()
            .topic_arn(&request.topic)
            .message(&request.message);

        if let Some(subject) = &request.subject {
            call = call.subject(subject);
        }

        for (key, value) in &request.attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|e| DeliveryError::rejected(format!("invalid attribute {key}: {e}")))?;
            call = call.message_attributes(key, attribute);
        }

        let output = call.send().await.map_err(map_sdk_error)?;
        let message_id = output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| DeliveryError::transport("SNS response without MessageId"))?;

        debug!(topic_arn = %request.topic, message_id = %message_id, "Published to SNS");
        Ok(message_id)
    }

    fn name(&self) -> &str {
        "sns"
    }
}

/// Error codes SNS uses when a caller is rate limited
const THROTTLING_CODES: [&str; 2] = ["Throttled", "Throttling"];

fn map_sdk_error(err: SdkError<PublishError, HttpResponse>) -> DeliveryError {
    match err {
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            classify_service_error(status, context.into_err())
        }
        other => DeliveryError::transport(format!("SNS publish failed: {other}")),
    }
}

fn classify_service_error(status: u16, error: PublishError) -> DeliveryError {
    if status >= 500 || error.is_internal_error_exception() {
        DeliveryError::NonSuccessStatus {
            status,
            body: Some(error.to_string()),
        }
    } else if error
        .meta()
        .code()
        .is_some_and(|code| THROTTLING_CODES.contains(&code))
    {
        DeliveryError::transport(format!("SNS throttled: {error}"))
    } else {
        DeliveryError::rejected(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::error::ErrorMetadata;

    fn service_error(code: &str) -> PublishError {
        PublishError::generic(ErrorMetadata::builder().code(code).message("from SNS").build())
    }

    #[test]
    fn test_throttling_is_retryable() {
        let error = classify_service_error(400, service_error("Throttled"));
        assert_eq!(error.kind(), "transport_failure");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_server_error_is_retryable() {
        let error = classify_service_error(503, service_error("ServiceUnavailable"));
        assert!(matches!(
            error,
            DeliveryError::NonSuccessStatus { status: 503, .. }
        ));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_client_error_is_rejected() {
        let error = classify_service_error(404, service_error("NotFound"));
        assert_eq!(error.kind(), "rejected");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_dispatch_failure_is_transport() {
        let error = map_sdk_error(SdkError::timeout_error("connect timed out"));
        assert!(error.is_retryable());
    }
}
