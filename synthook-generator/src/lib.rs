//! Payload Generation for Synthook
//!
//! Turns a natural-language scenario into candidate webhook text by asking
//! a chat-completions service, grounded with the example payloads of the
//! resolved event type.
//!
//! # Features
//!
//! - **Few-shot Prompts**: Fixed instruction, serialized examples, scenario
//! - **Low Temperature**: Deterministic-leaning output by default
//! - **Single Repair Pass**: Strips code fences and surrounding prose
//! - **No Hidden Retries**: A regenerated payload is the caller's decision
//! - **Caller Timeouts**: [`generate_with_timeout`] bounds any generator
//!
//! # Example
//!
//! ```rust,no_run
//! use synthook_generator::{ChatCompletionsGenerator, GeneratorConfig, PayloadGenerator};
//! use synthook_schema::{EventType, ExampleStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeneratorConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .model("gpt-4.1-mini")
//!         .build();
//!     let generator = ChatCompletionsGenerator::new(config)?;
//!
//!     let store = ExampleStore::builtin();
//!     let examples: Vec<_> = store.examples_for(&EventType::cash_in()).cloned().collect();
//!
//!     let candidate = generator
//!         .generate("cash-in of 1000 BRL, confirmed", &EventType::cash_in(), &examples)
//!         .await?;
//!     println!("{}", candidate.text);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod mock;
mod prompt;
mod repair;

pub use client::ChatCompletionsGenerator;
pub use config::{
    DEFAULT_ENDPOINT, DEFAULT_SYSTEM_INSTRUCTION, GeneratorConfig, GeneratorConfigBuilder,
};
pub use error::GenerationError;
pub use prompt::{ChatMessage, Prompt};
pub use repair::{extract_json_object, repair};

use async_trait::async_trait;
use std::time::Duration;
use synthook_schema::{CandidatePayload, EventType, ExampleEvent};

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Produces candidate payload text for a scenario
///
/// Implementations must not retry internally: a regenerated payload is a
/// different artifact, so the decision belongs to the caller.
#[async_trait]
pub trait PayloadGenerator: Send + Sync {
    /// Generate candidate text for one scenario
    async fn generate(
        &self,
        scenario: &str,
        event_type: &EventType,
        examples: &[ExampleEvent],
    ) -> Result<CandidatePayload>;

    /// Name used in logs
    fn name(&self) -> &str {
        "generator"
    }
}

/// Run a generator under a caller-supplied timeout
///
/// The in-flight call is dropped when the timeout elapses.
pub async fn generate_with_timeout(
    generator: &dyn PayloadGenerator,
    timeout: Duration,
    scenario: &str,
    event_type: &EventType,
    examples: &[ExampleEvent],
) -> Result<CandidatePayload> {
    match tokio::time::timeout(timeout, generator.generate(scenario, event_type, examples)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::timeout(timeout)),
    }
}
