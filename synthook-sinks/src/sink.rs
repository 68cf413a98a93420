//! The sink capability and its shared retry driver

use crate::{DeliveryError, DeliveryOutcome, SinkConfig, SinkKind};
use async_trait::async_trait;
use std::future::Future;
use synthook_schema::ValidatedPayload;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A delivery target
///
/// Implementations provide one attempt; retries, per-attempt timeouts and
/// deadlines are applied uniformly by [`Sink::deliver_until`]. A sink never
/// mutates the payload, so repeating a delivery is safe.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Transport this sink speaks
    fn kind(&self) -> SinkKind;

    /// Make a single delivery attempt, returning the delivery id
    async fn send_once(
        &self,
        payload: &ValidatedPayload,
        config: &SinkConfig,
    ) -> Result<String, DeliveryError>;

    /// Deliver with the configured retry policy
    async fn deliver(&self, payload: &ValidatedPayload, config: &SinkConfig) -> DeliveryOutcome {
        self.deliver_until(payload, config, None).await
    }

    /// Deliver with the configured retry policy, giving up at `deadline`
    async fn deliver_until(
        &self,
        payload: &ValidatedPayload,
        config: &SinkConfig,
        deadline: Option<Instant>,
    ) -> DeliveryOutcome {
        drive(config, deadline, || self.send_once(payload, config)).await
    }
}

/// Wait for `fut`, or return `None` once `deadline` passes
///
/// A deadline that has already passed wins even over a future that is
/// ready on its first poll.
pub async fn until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::select! {
            biased;
            _ = tokio::time::sleep_until(deadline) => None,
            output = fut => Some(output),
        },
        None => Some(fut.await),
    }
}

/// Apply timeout, retry policy and deadline to repeated attempts
pub(crate) async fn drive<F, Fut>(
    config: &SinkConfig,
    deadline: Option<Instant>,
    mut attempt_fn: F,
) -> DeliveryOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, DeliveryError>>,
{
    let policy = &config.retry;
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!(sink_id = %config.id, attempt, "Delivery attempt");

        let attempted = until(deadline, tokio::time::timeout(config.timeout, attempt_fn())).await;
        let error = match attempted {
            None => return canceled(config, attempt),
            Some(Ok(Ok(delivery_id))) => {
                let latency = started.elapsed();
                info!(
                    sink_id = %config.id,
                    attempt,
                    delivery_id = %delivery_id,
                    latency_ms = latency.as_millis() as u64,
                    "Payload delivered"
                );
                return DeliveryOutcome::Delivered {
                    delivery_id,
                    attempts: attempt,
                    latency,
                };
            }
            Some(Ok(Err(error))) => error,
            Some(Err(_)) => DeliveryError::timeout(config.timeout),
        };

        warn!(sink_id = %config.id, attempt, error = %error, "Delivery attempt failed");

        if !error.is_retryable() {
            return DeliveryOutcome::Failed {
                error,
                attempts: attempt,
                exhausted: false,
            };
        }

        if !policy.should_retry(attempt) {
            warn!(sink_id = %config.id, attempts = attempt, "Retry budget exhausted");
            return DeliveryOutcome::Failed {
                error,
                attempts: attempt,
                exhausted: true,
            };
        }

        let delay = policy.delay_for_attempt(attempt);
        if until(deadline, tokio::time::sleep(delay)).await.is_none() {
            return canceled(config, attempt);
        }
    }
}

fn canceled(config: &SinkConfig, attempts: u32) -> DeliveryOutcome {
    warn!(sink_id = %config.id, attempts, "Delivery canceled at deadline");
    DeliveryOutcome::Failed {
        error: DeliveryError::Canceled,
        attempts,
        exhausted: false,
    }
}
