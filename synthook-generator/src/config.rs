//! Configuration for the chat-completions generator

use secrecy::SecretString;
use std::time::Duration;

/// Default endpoint for OpenAI-compatible chat completions
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Instruction sent as the system message of every prompt
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You simulate webhooks sent by a Pix payment \
provider. Produce exactly one webhook event as a single JSON object with the same fields and \
value formats as the reference payloads. Use fictitious identifiers, names and documents. \
Amounts are integers in minor currency units (centavos). Timestamps are RFC 3339. Reply with \
the JSON object only, without Markdown or commentary.";

/// Configuration for [`ChatCompletionsGenerator`](crate::ChatCompletionsGenerator)
#[derive(Debug)]
pub struct GeneratorConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Model name sent with every request
    pub model: String,

    /// Bearer key; requests are sent unauthenticated when absent
    pub api_key: Option<SecretString>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Transport-level timeout for one call
    pub timeout: Duration,

    /// System message of every prompt
    pub system_instruction: String,

    /// User-Agent header for outgoing requests
    pub user_agent: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 512,
            timeout: Duration::from_secs(30),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            user_agent: format!("Synthook/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }
}

/// Builder for GeneratorConfig
#[derive(Debug, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the bearer key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into()));
        self
    }

    /// Set an already-wrapped bearer key
    pub fn api_key_secret(mut self, api_key: SecretString) -> Self {
        self.config.api_key = Some(api_key);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the system instruction
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = instruction.into();
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}
