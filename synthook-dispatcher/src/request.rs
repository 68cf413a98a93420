//! Inbound simulation request

use serde::{Deserialize, Serialize};
use std::time::Duration;
use synthook_schema::EventType;
use synthook_sinks::SinkId;

/// One scenario to generate and deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    /// Natural-language description of the event
    pub scenario: String,

    /// Event type to use instead of inferring it from the scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type_hint: Option<EventType>,

    /// Sink to deliver to
    pub sink_id: SinkId,

    /// Overall budget for this request; the dispatcher default applies when absent
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl ScenarioRequest {
    /// Create a request with no hint and no explicit deadline
    pub fn new(scenario: impl Into<String>, sink_id: impl Into<SinkId>) -> Self {
        Self {
            scenario: scenario.into(),
            event_type_hint: None,
            sink_id: sink_id.into(),
            deadline: None,
        }
    }

    /// Set the event type hint
    pub fn with_event_type(mut self, event_type: impl Into<EventType>) -> Self {
        self.event_type_hint = Some(event_type.into());
        self
    }

    /// Set the overall deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
