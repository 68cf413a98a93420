//! Integration tests for synthook-sinks

use std::sync::Arc;
use std::time::Duration;
use synthook_schema::{EventType, SchemaRegistry, ValidatedPayload};
use synthook_sinks::*;
use tokio::time::Instant;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CASH_IN: &str = r#"{"id":"123","type":"cashin","amount":1000,"currency":"BRL","status":"confirmed","createdAt":"2025-08-27T12:00:00Z"}"#;

fn payload() -> ValidatedPayload {
    SchemaRegistry::builtin()
        .validate(&EventType::cash_in(), CASH_IN)
        .unwrap()
}

fn http_config(server: &MockServer, attempts: u32) -> SinkConfig {
    SinkConfig::http("local", format!("{}/webhook", server.uri()))
        .with_timeout(Duration::from_secs(2))
        .with_retry(RetryPolicy::fixed(attempts, Duration::from_millis(10)))
}

#[tokio::test]
async fn test_http_delivery_sends_canonical_body_and_headers() {
    let server = MockServer::start().await;
    let payload = payload();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(header("content-type", "application/json"))
        .and(header(
            "x-correlation-id",
            payload.correlation_id().to_string().as_str(),
        ))
        .and(header("x-event-type", "cash-in"))
        .and(header("x-payload-digest", payload.digest()))
        .and(header("x-env", "test"))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Delivery-Id", "rcv-42"))
        .expect(1)
        .mount(&server)
        .await;

    let config = http_config(&server, 3).with_header("X-Env", "test");
    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload, &config).await;

    assert_eq!(outcome.delivery_id(), Some("rcv-42"));
    assert_eq!(outcome.attempts(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, payload.canonical_bytes());
}

#[tokio::test]
async fn test_http_fail_fail_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let payload = payload();
    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload, &http_config(&server, 3)).await;

    match outcome {
        DeliveryOutcome::Delivered {
            ref delivery_id,
            attempts,
            ..
        } => {
            assert_eq!(attempts, 3);
            // No receiver id header, so one is minted locally
            assert!(uuid::Uuid::parse_str(delivery_id).is_ok());
        }
        other => panic!("expected delivery, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    let expected = payload.correlation_id().to_string();
    for request in &requests {
        let id = request.headers.get("x-correlation-id").unwrap();
        assert_eq!(id.to_str().unwrap(), expected);
    }
}

#[tokio::test]
async fn test_http_client_error_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad amount"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload(), &http_config(&server, 5)).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Failed {
            error: DeliveryError::NonSuccessStatus {
                status: 422,
                body: Some("bad amount".to_string()),
            },
            attempts: 1,
            exhausted: false,
        }
    );
}

#[tokio::test]
async fn test_http_malformed_header_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = http_config(&server, 3).with_header("bad header", "x");
    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload(), &config).await;

    assert_eq!(outcome.error().map(DeliveryError::kind), Some("rejected"));
    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed {
            attempts: 1,
            exhausted: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_http_unreachable_exhausts_budget() {
    let config = SinkConfig::http("dead", "http://127.0.0.1:1/webhook")
        .with_retry(RetryPolicy::fixed(4, Duration::from_millis(5)));

    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload(), &config).await;

    match outcome {
        DeliveryOutcome::Failed {
            error,
            attempts,
            exhausted,
        } => {
            assert_eq!(error.kind(), "transport_failure");
            assert_eq!(attempts, 4);
            assert!(exhausted);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_slow_receiver_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = http_config(&server, 2).with_timeout(Duration::from_millis(100));
    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver(&payload(), &config).await;

    assert_eq!(outcome.error().map(DeliveryError::kind), Some("timeout"));
    assert_eq!(outcome.attempts(), 2);
}

#[tokio::test]
async fn test_http_deadline_cancels_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = SinkConfig::http("local", format!("{}/webhook", server.uri()))
        .with_retry(RetryPolicy::fixed(10, Duration::from_secs(5)));
    let deadline = Instant::now() + Duration::from_millis(300);

    let sink = HttpSink::new("Synthook/test").unwrap();
    let outcome = sink.deliver_until(&payload(), &config, Some(deadline)).await;

    assert_eq!(outcome.error(), Some(&DeliveryError::Canceled));
    assert_eq!(outcome.attempts(), 1);
}

#[tokio::test]
async fn test_pubsub_publishes_body_and_attributes() {
    let publisher = Arc::new(MemoryPublisher::new());
    let sink = PubSubSink::new(publisher.clone());
    let config = SinkConfig::pubsub("events", "webhook-events").with_subject("Pix webhook");
    let payload = payload();

    let outcome = sink.deliver(&payload, &config).await;
    assert!(outcome.is_delivered());

    let published = publisher.published_to("webhook-events");
    assert_eq!(published.len(), 1);
    assert_eq!(outcome.delivery_id(), Some(published[0].message_id.as_str()));

    let request = &published[0].request;
    assert_eq!(request.message, payload.canonical_json());
    assert_eq!(request.subject.as_deref(), Some("Pix webhook"));
    assert_eq!(
        request.attributes.get(CORRELATION_ID_ATTRIBUTE),
        Some(&payload.correlation_id().to_string())
    );
    assert_eq!(
        request.attributes.get(EVENT_TYPE_ATTRIBUTE).map(String::as_str),
        Some("cash-in")
    );
    assert!(!request.attributes.values().any(|v| v.contains("cashin")));
}

#[tokio::test(start_paused = true)]
async fn test_pubsub_retries_broker_failures() {
    let publisher = Arc::new(MemoryPublisher::new());
    publisher.fail_next(DeliveryError::transport("connection reset"));
    publisher.fail_next(DeliveryError::NonSuccessStatus {
        status: 500,
        body: None,
    });

    let sink = PubSubSink::new(publisher.clone());
    let config = SinkConfig::pubsub("events", "webhook-events")
        .with_retry(RetryPolicy::exponential(3));

    let outcome = sink.deliver(&payload(), &config).await;

    assert_eq!(outcome.attempts(), 3);
    assert!(outcome.is_delivered());
    assert_eq!(publisher.attempts(), 3);
}

#[tokio::test]
async fn test_pubsub_rejection_is_final() {
    let publisher = Arc::new(MemoryPublisher::new());
    publisher.fail_next(DeliveryError::rejected("topic does not exist"));

    let sink = PubSubSink::new(publisher.clone());
    let outcome = sink
        .deliver(&payload(), &SinkConfig::pubsub("events", "missing"))
        .await;

    assert_eq!(outcome.error().map(DeliveryError::kind), Some("rejected"));
    assert_eq!(publisher.attempts(), 1);
    assert!(publisher.published().is_empty());
}
