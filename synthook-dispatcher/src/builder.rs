//! Dispatcher construction

use crate::dispatcher::{Dispatcher, SinkEntry};
use crate::{BuildError, DispatchConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use synthook_generator::PayloadGenerator;
use synthook_schema::{ExampleStore, SchemaRegistry};
use synthook_sinks::{Sink, SinkConfig};
use tokio::sync::Semaphore;
use tracing::info;

/// Builder for [`Dispatcher`]
///
/// `build` fails fast: every registered event type needs valid examples,
/// and every sink needs a usable configuration and a unique id.
#[derive(Default)]
pub struct DispatcherBuilder {
    registry: Option<SchemaRegistry>,
    examples: Option<ExampleStore>,
    generator: Option<Arc<dyn PayloadGenerator>>,
    sinks: Vec<(SinkConfig, Arc<dyn Sink>)>,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    /// Create a builder using the built-in registry and examples
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a schema registry
    pub fn registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use an example store
    pub fn examples(mut self, examples: ExampleStore) -> Self {
        self.examples = Some(examples);
        self
    }

    /// Use a payload generator
    pub fn generator(mut self, generator: Arc<dyn PayloadGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Add a sink
    pub fn sink(mut self, config: SinkConfig, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push((config, sink));
        self
    }

    /// Replace all dispatch settings
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the regeneration budget
    pub fn max_regenerations(mut self, max: u32) -> Self {
        self.config.max_regenerations = max;
        self
    }

    /// Set the per-call generation timeout
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    /// Set the default request deadline
    pub fn default_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.config.default_deadline = deadline;
        self
    }

    /// Set the concurrency limits for generation and delivery
    pub fn concurrency(mut self, generation: usize, delivery: usize) -> Self {
        self.config.generation_concurrency = generation;
        self.config.delivery_concurrency = delivery;
        self
    }

    /// Validate everything and build the dispatcher
    pub fn build(self) -> Result<Dispatcher, BuildError> {
        self.config.check()?;

        let registry = self.registry.unwrap_or_else(SchemaRegistry::builtin);
        if registry.is_empty() {
            return Err(BuildError::EmptyRegistry);
        }

        let examples = self.examples.unwrap_or_else(ExampleStore::builtin);
        examples.verify(&registry)?;

        let generator = self.generator.ok_or(BuildError::MissingGenerator)?;

        let mut sinks = HashMap::with_capacity(self.sinks.len());
        for (config, sink) in self.sinks {
            config.validate()?;

            if sink.kind() != config.kind {
                return Err(BuildError::SinkKindMismatch {
                    sink_id: config.id,
                    configured: config.kind,
                    actual: sink.kind(),
                });
            }
            if sinks.contains_key(&config.id) {
                return Err(BuildError::DuplicateSink { sink_id: config.id });
            }

            sinks.insert(config.id.clone(), SinkEntry { config, sink });
        }

        info!(
            event_types = registry.len(),
            sinks = sinks.len(),
            generator = generator.name(),
            max_regenerations = self.config.max_regenerations,
            "Dispatcher ready"
        );

        Ok(Dispatcher {
            registry: Arc::new(registry),
            examples: Arc::new(examples),
            generator,
            sinks: Arc::new(sinks),
            generation_permits: Arc::new(Semaphore::new(self.config.generation_concurrency)),
            delivery_permits: Arc::new(Semaphore::new(self.config.delivery_concurrency)),
            config: self.config,
        })
    }
}
