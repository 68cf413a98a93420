//! Scripted generators for tests and offline runs

use crate::{GenerationError, PayloadGenerator, Result, repair};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use synthook_schema::{CandidatePayload, EventType, ExampleEvent};

/// Generator that replays a fixed script of responses
///
/// Each call takes the next scripted response; once the script is down to
/// its last entry that entry repeats. Text responses go through the same
/// repair pass as real service output.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    /// Replay the given responses in order
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String>>,
    {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with the same text
    pub fn always(text: impl Into<String>) -> Self {
        Self::new([Ok(text.into())])
    }

    /// Answer with texts in order
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Ok(t.into())))
    }

    /// Always fail with the same error
    pub fn failing(error: GenerationError) -> Self {
        Self::new([Err(error)])
    }

    /// Wait before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<String> {
        let mut script = self.script.lock();
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

#[async_trait]
impl PayloadGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _scenario: &str,
        _event_type: &EventType,
        _examples: &[ExampleEvent],
    ) -> Result<CandidatePayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_response().map(repair)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Generator that answers with the first example of the requested type
///
/// Used for dry runs where no generative service is configured.
#[derive(Debug, Default)]
pub struct ExampleEchoGenerator;

#[async_trait]
impl PayloadGenerator for ExampleEchoGenerator {
    async fn generate(
        &self,
        _scenario: &str,
        _event_type: &EventType,
        examples: &[ExampleEvent],
    ) -> Result<CandidatePayload> {
        examples
            .first()
            .map(|example| CandidatePayload::new(example.payload.to_string()))
            .ok_or(GenerationError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "example-echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_script_order_then_repeat() {
        let generator = ScriptedGenerator::texts(["first", "second"]);
        let et = EventType::cash_in();

        let a = generator.generate("", &et, &[]).await.unwrap();
        let b = generator.generate("", &et, &[]).await.unwrap();
        let c = generator.generate("", &et, &[]).await.unwrap();

        assert_eq!(a.text, "first");
        assert_eq!(b.text, "second");
        assert_eq!(c.text, "second");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_output_is_repaired() {
        let generator = ScriptedGenerator::always("```json\n{\"id\": \"1\"}\n```");
        let candidate = generator
            .generate("", &EventType::cash_in(), &[])
            .await
            .unwrap();

        assert_eq!(candidate.text, "{\"id\": \"1\"}");
    }

    #[tokio::test]
    async fn test_failing() {
        let generator = ScriptedGenerator::failing(GenerationError::EmptyResponse);
        let result = generator.generate("", &EventType::cash_in(), &[]).await;
        assert_eq!(result, Err(GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_example_echo() {
        let examples = vec![ExampleEvent::new(EventType::cash_in(), json!({"id": "123"}))];
        let candidate = ExampleEchoGenerator
            .generate("", &EventType::cash_in(), &examples)
            .await
            .unwrap();

        assert_eq!(candidate.text, r#"{"id":"123"}"#);
        assert!(
            ExampleEchoGenerator
                .generate("", &EventType::cash_in(), &[])
                .await
                .is_err()
        );
    }
}
