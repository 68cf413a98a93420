//! Scenario orchestration

use crate::outcome::DeliveryReceipt;
use crate::{
    DispatchConfig, DispatcherBuilder, ErrorDetail, FailureCause, FailureStage, RequestError,
    ScenarioRequest, SimulationOutcome, SimulationState, SimulationStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use synthook_generator::{PayloadGenerator, generate_with_timeout};
use synthook_schema::{
    CandidatePayload, CorrelationId, EventType, ExampleStore, SchemaRegistry, ValidatedPayload,
};
use synthook_sinks::{DeliveryOutcome, Sink, SinkConfig, SinkId, until};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

pub(crate) struct SinkEntry {
    pub(crate) config: SinkConfig,
    pub(crate) sink: Arc<dyn Sink>,
}

/// Runs scenarios through generation, validation and delivery
///
/// Stateless between requests: registries and sinks are shared read-only,
/// so a dispatcher can be cloned cheaply and used from many tasks.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) registry: Arc<SchemaRegistry>,
    pub(crate) examples: Arc<ExampleStore>,
    pub(crate) generator: Arc<dyn PayloadGenerator>,
    pub(crate) sinks: Arc<HashMap<SinkId, SinkEntry>>,
    pub(crate) generation_permits: Arc<Semaphore>,
    pub(crate) delivery_permits: Arc<Semaphore>,
    pub(crate) config: DispatchConfig,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event_types", &self.registry.len())
            .field("sinks", &self.sinks.len())
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Failure inside the generate-validate loop
struct RoundFailure {
    stage: FailureStage,
    cause: FailureCause,
    raw_text: Option<String>,
}

/// Book-keeping for one request
struct Run {
    correlation_id: CorrelationId,
    event_type: Option<EventType>,
    states: Vec<SimulationState>,
}

impl Run {
    fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            event_type: None,
            states: vec![SimulationState::Received],
        }
    }

    fn enter(&mut self, next: SimulationState) {
        let current = self.current();
        debug_assert!(current.can_transition_to(next), "{current} -> {next}");
        debug!(from = %current, to = %next, "State transition");
        self.states.push(next);
    }

    fn current(&self) -> SimulationState {
        self.states
            .last()
            .copied()
            .unwrap_or(SimulationState::Received)
    }

    fn fail(mut self, detail: ErrorDetail) -> SimulationOutcome {
        warn!(
            stage = ?detail.stage,
            kind = %detail.kind,
            message = %detail.message,
            "Simulation failed"
        );
        self.enter(SimulationState::Failed);
        SimulationOutcome {
            status: SimulationStatus::Failed,
            correlation_id: self.correlation_id,
            payload: None,
            error_detail: Some(detail),
            event_type: self.event_type,
            delivery: None,
            states: self.states,
        }
    }

    fn canceled(self, stage: FailureStage) -> SimulationOutcome {
        self.fail(ErrorDetail::new(stage, FailureCause::Canceled))
    }

    fn succeed(mut self, payload: &ValidatedPayload, receipt: DeliveryReceipt) -> SimulationOutcome {
        info!(
            delivery_id = %receipt.delivery_id,
            attempts = receipt.attempts,
            latency_ms = receipt.latency.as_millis() as u64,
            "Simulation succeeded"
        );
        self.enter(SimulationState::Succeeded);
        SimulationOutcome {
            status: SimulationStatus::Succeeded,
            correlation_id: self.correlation_id,
            payload: Some(payload.to_value()),
            error_detail: None,
            event_type: self.event_type,
            delivery: Some(receipt),
            states: self.states,
        }
    }
}

impl Dispatcher {
    /// Create a builder
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Schema registry in use
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Example store in use
    pub fn examples(&self) -> &ExampleStore {
        &self.examples
    }

    /// Settings in use
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Configured sink ids, sorted
    pub fn sink_ids(&self) -> Vec<&SinkId> {
        let mut ids: Vec<_> = self.sinks.keys().collect();
        ids.sort();
        ids
    }

    /// Configuration of one sink
    pub fn sink_config(&self, sink_id: &SinkId) -> Option<&SinkConfig> {
        self.sinks.get(sink_id).map(|entry| &entry.config)
    }

    /// Generate, validate and deliver one scenario
    ///
    /// Always resolves to a terminal outcome; errors are reported inside it.
    pub async fn simulate(&self, request: ScenarioRequest) -> SimulationOutcome {
        let correlation_id = CorrelationId::new();
        let span = info_span!(
            "simulate",
            correlation_id = %correlation_id,
            sink_id = %request.sink_id,
        );
        self.process(request, correlation_id)
            .instrument(span)
            .await
    }

    /// Run a batch concurrently, returning outcomes in request order
    pub async fn simulate_all<I>(&self, requests: I) -> Vec<SimulationOutcome>
    where
        I: IntoIterator<Item = ScenarioRequest>,
    {
        futures::future::join_all(requests.into_iter().map(|r| self.simulate(r))).await
    }

    async fn process(
        &self,
        request: ScenarioRequest,
        correlation_id: CorrelationId,
    ) -> SimulationOutcome {
        let mut run = Run::new(correlation_id);
        let deadline = request
            .deadline
            .or(self.config.default_deadline)
            .map(|budget| Instant::now() + budget);

        info!(scenario = %request.scenario, "Simulation received");

        let Some(entry) = self.sinks.get(&request.sink_id) else {
            let cause = RequestError::UnknownSink {
                sink_id: request.sink_id.clone(),
            };
            return run.fail(ErrorDetail::new(
                FailureStage::Received,
                FailureCause::Request(cause),
            ));
        };

        let event_type = match self.resolve_event_type(&request) {
            Ok(event_type) => event_type,
            Err(cause) => {
                return run.fail(ErrorDetail::new(
                    FailureStage::Received,
                    FailureCause::Request(cause),
                ));
            }
        };
        debug!(event_type = %event_type, "Event type resolved");
        run.event_type = Some(event_type.clone());

        let payload = match self
            .generate_valid(&mut run, &request.scenario, &event_type, deadline)
            .await
        {
            Ok(payload) => payload,
            Err(failure) => {
                let mut detail = ErrorDetail::new(failure.stage, failure.cause);
                if let Some(raw) = failure.raw_text {
                    detail = detail.with_raw_text(raw);
                }
                return run.fail(detail);
            }
        };

        run.enter(SimulationState::Delivering);
        let Some(_permit) = until(deadline, self.delivery_permits.acquire()).await else {
            return run.canceled(FailureStage::Delivering);
        };

        match entry
            .sink
            .deliver_until(&payload, &entry.config, deadline)
            .await
        {
            DeliveryOutcome::Delivered {
                delivery_id,
                attempts,
                latency,
            } => run.succeed(
                &payload,
                DeliveryReceipt {
                    delivery_id,
                    attempts,
                    latency,
                },
            ),
            DeliveryOutcome::Failed {
                error, attempts, ..
            } => run.fail(
                ErrorDetail::new(FailureStage::Delivering, FailureCause::Delivery(error))
                    .with_attempts(attempts),
            ),
        }
    }

    fn resolve_event_type(&self, request: &ScenarioRequest) -> Result<EventType, RequestError> {
        match &request.event_type_hint {
            Some(hint) if self.registry.contains(hint) => Ok(hint.clone()),
            Some(hint) => Err(RequestError::UnregisteredEventType {
                event_type: hint.clone(),
            }),
            None => self
                .registry
                .infer(&request.scenario)
                .map_err(|source| RequestError::EventTypeNotInferred { source }),
        }
    }

    /// Generate until a candidate validates or the regeneration budget is spent
    async fn generate_valid(
        &self,
        run: &mut Run,
        scenario: &str,
        event_type: &EventType,
        deadline: Option<Instant>,
    ) -> Result<ValidatedPayload, RoundFailure> {
        let rounds = self.config.max_regenerations.saturating_add(1);
        let mut round = 0;

        loop {
            round += 1;
            run.enter(SimulationState::Generating);

            let candidate = match until(deadline, self.generate(scenario, event_type)).await {
                None => {
                    return Err(RoundFailure {
                        stage: FailureStage::Generating,
                        cause: FailureCause::Canceled,
                        raw_text: None,
                    });
                }
                Some(Ok(candidate)) => candidate,
                Some(Err(error)) => {
                    warn!(round, error = %error, "Generation failed");
                    let failure = RoundFailure {
                        stage: FailureStage::Generating,
                        cause: FailureCause::Generation(error),
                        raw_text: None,
                    };
                    if round >= rounds {
                        return Err(failure);
                    }
                    continue;
                }
            };

            run.enter(SimulationState::Validating);
            match self
                .registry
                .validate_as(event_type, &candidate.text, run.correlation_id)
            {
                Ok(payload) => {
                    debug!(round, digest = %payload.digest(), "Payload validated");
                    return Ok(payload);
                }
                Err(error) => {
                    warn!(round, error = %error, repaired = candidate.was_repaired(), "Validation failed");
                    let regenerable = error.is_regenerable();
                    let failure = RoundFailure {
                        stage: FailureStage::Validating,
                        cause: FailureCause::Validation(error),
                        raw_text: Some(candidate.raw),
                    };
                    if !regenerable || round >= rounds {
                        return Err(failure);
                    }
                }
            }
        }
    }

    async fn generate(
        &self,
        scenario: &str,
        event_type: &EventType,
    ) -> synthook_generator::Result<CandidatePayload> {
        // Never closed
        let _permit = self.generation_permits.acquire().await.ok();
        let examples = self.examples.examples_for(event_type).as_slice();

        generate_with_timeout(
            self.generator.as_ref(),
            self.config.generation_timeout,
            scenario,
            event_type,
            examples,
        )
        .await
    }
}
