//! Per-request state machine

use serde::Serialize;
use std::fmt;

/// Where a simulation request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    Received,
    Generating,
    Validating,
    Delivering,
    Succeeded,
    Failed,
}

impl SimulationState {
    /// Check if the state ends the request
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Check if moving to `next` is allowed
    ///
    /// Generating may repeat after a failed generation, and Validating may
    /// fall back to Generating for a regeneration.
    pub fn can_transition_to(self, next: Self) -> bool {
        use SimulationState::*;
        match (self, next) {
            (Succeeded | Failed, _) => false,
            (_, Failed) => true,
            (Received, Generating) => true,
            (Generating, Generating | Validating) => true,
            (Validating, Generating | Delivering) => true,
            (Delivering, Succeeded) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Generating => "generating",
            Self::Validating => "validating",
            Self::Delivering => "delivering",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
