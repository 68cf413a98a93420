//! Few-shot prompt assembly

use serde::{Deserialize, Serialize};
use synthook_schema::{EventType, ExampleEvent};

/// One message of a chat-completions conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Prompt for one generation call
///
/// Always three messages in a fixed order: the instruction, the serialized
/// examples, the scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub instruction: String,
    pub examples: String,
    pub scenario: String,
}

impl Prompt {
    /// Build the prompt for a scenario and its event type's examples
    pub fn build(
        instruction: &str,
        scenario: &str,
        event_type: &EventType,
        examples: &[ExampleEvent],
    ) -> Self {
        let mut block = format!("Reference payloads for event type `{event_type}`:\n");
        for (i, example) in examples.iter().enumerate() {
            block.push('\n');
            if let Some(description) = &example.description {
                block.push_str(&format!("Example {} ({description}):\n", i + 1));
            } else {
                block.push_str(&format!("Example {}:\n", i + 1));
            }
            block.push_str(&example.payload.to_string());
            block.push('\n');
        }

        Self {
            instruction: instruction.to_string(),
            examples: block,
            scenario: format!("Scenario: {}", scenario.trim()),
        }
    }

    /// Messages in request order
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(&self.instruction),
            ChatMessage::user(&self.examples),
            ChatMessage::user(&self.scenario),
        ]
    }
}
