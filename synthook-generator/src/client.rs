//! Chat-completions generator

use crate::{GenerationError, GeneratorConfig, PayloadGenerator, Prompt, Result, repair};
use crate::prompt::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use synthook_schema::{CandidatePayload, EventType, ExampleEvent};
use tracing::{debug, warn};

/// Longest slice of an error body kept in messages
const ERROR_BODY_LIMIT: usize = 256;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint
#[derive(Debug)]
pub struct ChatCompletionsGenerator {
    config: GeneratorConfig,
    http_client: Client,
}

impl ChatCompletionsGenerator {
    /// Create a generator, building its HTTP client
    pub fn new(config: GeneratorConfig) -> std::result::Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::timeout(self.config.timeout)
        } else {
            GenerationError::from(err)
        }
    }
}

#[async_trait]
impl PayloadGenerator for ChatCompletionsGenerator {
    async fn generate(
        &self,
        scenario: &str,
        event_type: &EventType,
        examples: &[ExampleEvent],
    ) -> Result<CandidatePayload> {
        let prompt = Prompt::build(
            &self.config.system_instruction,
            scenario,
            event_type,
            examples,
        );
        let body = ChatRequest {
            model: &self.config.model,
            messages: prompt.messages(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            event_type = %event_type,
            examples = examples.len(),
            "Requesting payload generation"
        );

        let mut request = self.http_client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            warn!(status = status.as_u16(), "Generative service returned an error");
            return Err(GenerationError::ServiceUnavailable {
                message: format!("HTTP {status}: {excerpt}"),
                status: Some(status.as_u16()),
            });
        }

        let envelope: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::timeout(self.config.timeout)
            } else {
                GenerationError::unavailable(format!("unreadable response: {e}"))
            }
        })?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        let candidate = repair(content);
        debug!(
            repaired = candidate.was_repaired(),
            length = candidate.text.len(),
            "Received candidate payload"
        );
        Ok(candidate)
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}
