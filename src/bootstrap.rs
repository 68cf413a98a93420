//! Wiring a [`Dispatcher`] from a [`HarnessConfig`]

use crate::Result;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use synthook_config::{
    DispatchSettings, GeneratorSettings, HarnessConfig, RetrySettings, SinkSettings,
};
use synthook_dispatcher::{DispatchConfig, Dispatcher};
use synthook_generator::{ChatCompletionsGenerator, GeneratorConfig, PayloadGenerator};
use synthook_schema::{ExampleStore, SchemaRegistry};
use synthook_sinks::{HttpSink, PubSubSink, Publisher, RetryPolicy, Sink, SinkConfig, SinkKind};
use tracing::info;

/// User agent sent by generator and HTTP sink clients
pub fn user_agent() -> String {
    format!("Synthook/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds a dispatcher from configuration
///
/// Real clients are created for every collaborator not supplied explicitly.
/// Supplying a generator or publisher lets callers wire the harness without
/// reaching any external service.
pub struct HarnessBuilder<'a> {
    config: &'a HarnessConfig,
    api_key: Option<SecretString>,
    generator: Option<Arc<dyn PayloadGenerator>>,
    publisher: Option<Arc<dyn Publisher>>,
}

impl<'a> HarnessBuilder<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self {
            config,
            api_key: None,
            generator: None,
            publisher: None,
        }
    }

    /// API key for the chat-completions generator
    pub fn api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Use this generator instead of the chat-completions client
    pub fn generator(mut self, generator: Arc<dyn PayloadGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Use this publisher for every pub/sub sink
    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub async fn build(self) -> Result<Dispatcher> {
        let config = self.config;
        let (registry, examples) = registry_and_examples(config)?;

        let generator = match self.generator {
            Some(generator) => generator,
            None => {
                let generator_config = generator_config(&config.generator, self.api_key);
                Arc::new(ChatCompletionsGenerator::new(generator_config)?)
            }
        };

        let mut builder = Dispatcher::builder()
            .registry(registry)
            .examples(examples)
            .generator(generator)
            .config(dispatch_config(&config.dispatch));

        let mut http_sink: Option<Arc<dyn Sink>> = None;
        let mut pubsub_sink: Option<Arc<dyn Sink>> = None;

        for settings in &config.sinks {
            let sink = match settings.kind {
                SinkKind::Http => match &http_sink {
                    Some(sink) => sink.clone(),
                    None => {
                        let sink: Arc<dyn Sink> = Arc::new(HttpSink::new(&user_agent())?);
                        http_sink = Some(sink.clone());
                        sink
                    }
                },
                SinkKind::Pubsub => match &pubsub_sink {
                    Some(sink) => sink.clone(),
                    None => {
                        let publisher = match &self.publisher {
                            Some(publisher) => publisher.clone(),
                            None => default_publisher(config).await,
                        };
                        let sink: Arc<dyn Sink> = Arc::new(PubSubSink::new(publisher));
                        pubsub_sink = Some(sink.clone());
                        sink
                    }
                },
            };

            builder = builder.sink(sink_config(config, settings), sink);
        }

        let dispatcher = builder.build()?;
        info!(
            sinks = config.sinks.len(),
            event_types = dispatcher.registry().len(),
            "Harness ready"
        );
        Ok(dispatcher)
    }
}

/// Schema registry and example store for the configured event types
///
/// Without configured event types the built-in cash-in and cash-out
/// definitions are used. Configured types replace the built-ins entirely.
pub fn registry_and_examples(config: &HarnessConfig) -> Result<(SchemaRegistry, ExampleStore)> {
    if config.event_types.is_empty() {
        return Ok((SchemaRegistry::builtin(), ExampleStore::builtin()));
    }

    let mut registry = SchemaRegistry::new();
    let mut examples = ExampleStore::new();

    for settings in &config.event_types {
        let event_type = settings.event_type();
        registry.register(event_type.clone(), settings.schema());
        registry.register_keywords(&event_type, &settings.keywords);

        examples.extend(&event_type, settings.examples.iter().cloned());
        if let Some(path) = &settings.examples_file {
            examples.load_file(&event_type, config.resolve_path(path))?;
        }
    }

    Ok((registry, examples))
}

pub fn generator_config(
    settings: &GeneratorSettings,
    api_key: Option<SecretString>,
) -> GeneratorConfig {
    let mut builder = GeneratorConfig::builder()
        .endpoint(&settings.endpoint)
        .model(&settings.model)
        .temperature(settings.temperature)
        .max_tokens(settings.max_tokens)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .user_agent(user_agent());

    if let Some(instruction) = &settings.system_instruction {
        builder = builder.system_instruction(instruction);
    }
    if let Some(api_key) = api_key {
        builder = builder.api_key_secret(api_key);
    }
    builder.build()
}

pub fn dispatch_config(settings: &DispatchSettings) -> DispatchConfig {
    DispatchConfig {
        max_regenerations: settings.max_regenerations,
        generation_timeout: Duration::from_millis(settings.generation_timeout_ms),
        default_deadline: settings.deadline_ms.map(Duration::from_millis),
        generation_concurrency: settings.generation_concurrency,
        delivery_concurrency: settings.delivery_concurrency,
    }
}

pub fn retry_policy(settings: &RetrySettings) -> RetryPolicy {
    RetryPolicy {
        max_attempts: settings.max_attempts,
        initial_delay: Duration::from_millis(settings.initial_delay_ms),
        max_delay: Duration::from_millis(settings.max_delay_ms),
        backoff_multiplier: settings.backoff_multiplier,
        jitter: settings.jitter,
    }
}

pub fn sink_config(config: &HarnessConfig, settings: &SinkSettings) -> SinkConfig {
    let mut sink = SinkConfig::new(settings.id.as_str(), settings.kind, &settings.address)
        .with_timeout(Duration::from_millis(settings.timeout_ms))
        .with_retry(retry_policy(config.retry_for(settings)));

    for (name, value) in &settings.headers {
        sink = sink.with_header(name, value);
    }
    if let Some(subject) = &settings.subject {
        sink = sink.with_subject(subject);
    }
    sink
}

#[cfg(feature = "aws")]
async fn default_publisher(config: &HarnessConfig) -> Arc<dyn Publisher> {
    let settings = synthook_sinks::SnsSettings {
        region: config.aws.region.clone(),
        endpoint_url: config.aws.endpoint_url.clone(),
    };
    Arc::new(synthook_sinks::SnsPublisher::connect(&settings).await)
}

#[cfg(not(feature = "aws"))]
async fn default_publisher(_config: &HarnessConfig) -> Arc<dyn Publisher> {
    tracing::warn!("Built without the `aws` feature; pub/sub sinks publish to memory");
    Arc::new(synthook_sinks::MemoryPublisher::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use synthook_config::{EventTypeSettings, FileFormat};
    use synthook_generator::mock::ExampleEchoGenerator;
    use synthook_schema::{EventType, FieldKind, FieldSpec};
    use synthook_sinks::MemoryPublisher;

    #[test]
    fn test_builtin_types_without_configuration() {
        let (registry, examples) = registry_and_examples(&HarnessConfig::default()).unwrap();
        assert!(registry.contains(&EventType::cash_in()));
        assert!(examples.count(&EventType::cash_out()) > 0);
    }

    #[test]
    fn test_configured_types_replace_builtins() {
        let config = HarnessConfig {
            event_types: vec![EventTypeSettings {
                name: "refund".to_string(),
                keywords: vec!["chargeback".to_string()],
                fields: vec![FieldSpec {
                    name: "id".to_string(),
                    kind: FieldKind::String,
                    required: true,
                }],
                examples: vec![json!({"id": "r1"})],
                examples_file: None,
            }],
            ..Default::default()
        };

        let (registry, examples) = registry_and_examples(&config).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&EventType::cash_in()));
        assert_eq!(registry.infer("a chargeback").unwrap(), EventType::new("refund"));
        assert_eq!(examples.count(&EventType::new("refund")), 1);
    }

    #[test]
    fn test_sink_config_conversion() {
        let config = synthook_config::from_str(
            r#"
            [retry]
            max_attempts = 4
            initial_delay_ms = 50
            jitter = false

            [[sinks]]
            id = "local"
            kind = "http"
            address = "http://localhost:8080/webhook"
            timeout_ms = 2500
            headers = { "X-Env" = "dev" }
            "#,
            FileFormat::Toml,
        )
        .unwrap();

        let sink = sink_config(&config, &config.sinks[0]);
        assert_eq!(sink.id.as_str(), "local");
        assert_eq!(sink.timeout, Duration::from_millis(2500));
        assert_eq!(sink.retry.max_attempts, 4);
        assert_eq!(sink.retry.initial_delay, Duration::from_millis(50));
        assert!(!sink.retry.jitter);
        assert_eq!(sink.headers.get("X-Env").map(String::as_str), Some("dev"));
        assert!(sink.validate().is_ok());
    }

    #[test]
    fn test_dispatch_config_conversion() {
        let settings = DispatchSettings {
            deadline_ms: None,
            ..Default::default()
        };
        let dispatch = dispatch_config(&settings);

        assert_eq!(dispatch.default_deadline, None);
        assert_eq!(dispatch.generation_timeout, Duration::from_secs(30));
        assert_eq!(dispatch.max_regenerations, 1);
    }

    #[tokio::test]
    async fn test_build_shares_sink_instances() {
        let config = synthook_config::from_str(
            r#"
            [[sinks]]
            id = "a"
            kind = "http"
            address = "http://localhost:1/a"

            [[sinks]]
            id = "b"
            kind = "http"
            address = "http://localhost:1/b"

            [[sinks]]
            id = "events"
            kind = "pubsub"
            address = "pix-events"
            "#,
            FileFormat::Toml,
        )
        .unwrap();

        let dispatcher = HarnessBuilder::new(&config)
            .generator(Arc::new(ExampleEchoGenerator))
            .publisher(Arc::new(MemoryPublisher::new()))
            .build()
            .await
            .unwrap();

        let ids: Vec<_> = dispatcher
            .sink_ids()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "events"]);
    }
}
