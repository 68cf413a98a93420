// Harness configuration model

use crate::{ConfigError, ConfigValidator, Result, Validate};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use synthook_schema::{EventType, FieldSpec, Schema};
use synthook_sinks::SinkKind;

/// Complete harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub generator: GeneratorSettings,
    pub dispatch: DispatchSettings,
    /// Retry defaults for sinks without their own policy
    pub retry: RetrySettings,
    pub sinks: Vec<SinkSettings>,
    pub aws: AwsSettings,
    /// Custom event types; the built-in cash-in and cash-out apply when empty
    pub event_types: Vec<EventTypeSettings>,

    /// Directory relative example files are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub system_instruction: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            timeout_ms: 30_000,
            system_instruction: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub max_regenerations: u32,
    pub generation_timeout_ms: u64,
    /// Default overall budget per request; `None` disables it
    pub deadline_ms: Option<u64>,
    pub generation_concurrency: usize,
    pub delivery_concurrency: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_regenerations: 1,
            generation_timeout_ms: 30_000,
            deadline_ms: Some(120_000),
            generation_concurrency: 4,
            delivery_concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkSettings {
    pub id: String,
    pub kind: SinkKind,
    /// Webhook URL or topic identifier
    pub address: String,
    #[serde(default = "default_sink_timeout_ms")]
    pub timeout_ms: u64,
    /// Overrides the top-level retry defaults
    #[serde(default)]
    pub retry: Option<RetrySettings>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub subject: Option<String>,
}

fn default_sink_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeSettings {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub examples: Vec<Value>,
    #[serde(default)]
    pub examples_file: Option<PathBuf>,
}

impl EventTypeSettings {
    pub fn event_type(&self) -> EventType {
        EventType::new(&self.name)
    }

    pub fn schema(&self) -> Schema {
        Schema {
            fields: self.fields.clone(),
        }
    }
}

impl HarnessConfig {
    /// Retry settings in effect for a sink
    pub fn retry_for<'a>(&'a self, sink: &'a SinkSettings) -> &'a RetrySettings {
        sink.retry.as_ref().unwrap_or(&self.retry)
    }

    /// Resolve an example file path against the config file directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Read the API key from the variable named by `generator.api_key_env`
    pub fn api_key(&self) -> Option<SecretString> {
        self.api_key_from(|var| std::env::var(var).ok())
    }

    /// Read the API key through an arbitrary variable lookup
    pub fn api_key_from<F>(&self, lookup: F) -> Option<SecretString>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.generator.api_key_env)
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::new(key.into()))
    }

    /// Like [`HarnessConfig::api_key`], but absence is an error
    pub fn require_api_key(&self) -> Result<SecretString> {
        self.api_key().ok_or_else(|| ConfigError::MissingSecret {
            var: self.generator.api_key_env.clone(),
        })
    }
}

impl Validate for RetrySettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::in_range(self.max_attempts, 1, 100, "retry.max_attempts")?;
        ConfigValidator::at_least(self.backoff_multiplier, 1.0, "retry.backoff_multiplier")?;
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::ValidationError(
                "retry.initial_delay_ms must not exceed retry.max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for HarnessConfig {
    fn validate(&self) -> Result<()> {
        let generator = &self.generator;
        ConfigValidator::is_url(&generator.endpoint, "generator.endpoint")?;
        ConfigValidator::not_empty(&generator.model, "generator.model")?;
        ConfigValidator::not_empty(&generator.api_key_env, "generator.api_key_env")?;
        ConfigValidator::in_range(generator.temperature, 0.0, 2.0, "generator.temperature")?;
        ConfigValidator::at_least(generator.max_tokens, 1, "generator.max_tokens")?;
        ConfigValidator::at_least(generator.timeout_ms, 1, "generator.timeout_ms")?;

        let dispatch = &self.dispatch;
        ConfigValidator::at_least(
            dispatch.generation_timeout_ms,
            1,
            "dispatch.generation_timeout_ms",
        )?;
        if let Some(deadline) = dispatch.deadline_ms {
            ConfigValidator::at_least(deadline, 1, "dispatch.deadline_ms")?;
        }
        ConfigValidator::at_least(
            dispatch.generation_concurrency,
            1,
            "dispatch.generation_concurrency",
        )?;
        ConfigValidator::at_least(
            dispatch.delivery_concurrency,
            1,
            "dispatch.delivery_concurrency",
        )?;

        self.retry.validate()?;

        let mut sink_ids = HashSet::new();
        for sink in &self.sinks {
            ConfigValidator::not_empty(&sink.id, "sinks[].id")?;
            if !sink_ids.insert(sink.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate sink id '{}'",
                    sink.id
                )));
            }

            let field = format!("sinks.{}.address", sink.id);
            ConfigValidator::not_empty(&sink.address, &field)?;
            if sink.kind == SinkKind::Http {
                ConfigValidator::is_url(&sink.address, &field)?;
            }
            ConfigValidator::at_least(sink.timeout_ms, 1, &format!("sinks.{}.timeout_ms", sink.id))?;
            if let Some(retry) = &sink.retry {
                retry.validate()?;
            }
        }

        let mut names = HashSet::new();
        for event_type in &self.event_types {
            ConfigValidator::not_empty(&event_type.name, "event_types[].name")?;
            if !names.insert(event_type.event_type()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate event type '{}'",
                    event_type.name
                )));
            }
            if event_type.fields.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "event type '{}' declares no fields",
                    event_type.name
                )));
            }
            if event_type.examples.is_empty() && event_type.examples_file.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "event type '{}' needs examples or an examples_file",
                    event_type.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn sink(id: &str, kind: SinkKind, address: &str) -> SinkSettings {
        SinkSettings {
            id: id.to_string(),
            kind,
            address: address.to_string(),
            timeout_ms: 1000,
            retry: None,
            headers: BTreeMap::new(),
            subject: None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generator.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.dispatch.max_regenerations, 1);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_duplicate_sink_rejected() {
        let config = HarnessConfig {
            sinks: vec![
                sink("local", SinkKind::Http, "http://localhost:8080/webhook"),
                sink("local", SinkKind::Pubsub, "topic"),
            ],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate sink id"));
    }

    #[test]
    fn test_http_sink_needs_url() {
        let config = HarnessConfig {
            sinks: vec![sink("local", SinkKind::Http, "localhost:8080")],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HarnessConfig {
            sinks: vec![sink("events", SinkKind::Pubsub, "webhook-events")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = HarnessConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = HarnessConfig::default();
        config.retry.initial_delay_ms = 60_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_range() {
        let mut config = HarnessConfig::default();
        config.generator.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sink_retry_override() {
        let mut custom = sink("local", SinkKind::Http, "http://localhost:8080/webhook");
        custom.retry = Some(RetrySettings {
            max_attempts: 7,
            ..Default::default()
        });
        let config = HarnessConfig {
            sinks: vec![custom.clone()],
            ..Default::default()
        };

        assert_eq!(config.retry_for(&custom).max_attempts, 7);
        assert_eq!(
            config
                .retry_for(&sink("other", SinkKind::Pubsub, "t"))
                .max_attempts,
            3
        );
    }

    #[test]
    fn test_api_key_lookup() {
        let config = HarnessConfig::default();

        let key = config
            .api_key_from(|var| (var == "OPENAI_API_KEY").then(|| "sk-test".to_string()))
            .unwrap();
        assert_eq!(key.expose_secret(), "sk-test");

        assert!(config.api_key_from(|_| Some("  ".to_string())).is_none());
        assert!(config.api_key_from(|_| None).is_none());
    }

    #[test]
    fn test_event_type_needs_examples() {
        let config = HarnessConfig {
            event_types: vec![EventTypeSettings {
                name: "refund".to_string(),
                keywords: vec!["chargeback".to_string()],
                fields: vec![FieldSpec {
                    name: "id".to_string(),
                    kind: synthook_schema::FieldKind::String,
                    required: true,
                }],
                examples: Vec::new(),
                examples_file: None,
            }],
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_path() {
        let config = HarnessConfig {
            base_dir: Some(PathBuf::from("/etc/synthook")),
            ..Default::default()
        };

        assert_eq!(
            config.resolve_path(Path::new("refund.json")),
            PathBuf::from("/etc/synthook/refund.json")
        );
        assert_eq!(
            config.resolve_path(Path::new("/tmp/refund.json")),
            PathBuf::from("/tmp/refund.json")
        );
    }
}
