// Synthook - synthetic payment-webhook harness
//
// Turns natural-language scenarios into schema-checked webhook payloads and
// delivers them to HTTP endpoints or pub/sub topics, so webhook consumers can
// be exercised without a live payment provider.

pub mod bootstrap;
pub mod catalog;
mod error;

pub use bootstrap::HarnessBuilder;
pub use catalog::ScenarioCatalog;
pub use error::{HarnessError, Result};

// Re-export member crates
pub use synthook_config as config;
pub use synthook_dispatcher as dispatcher;
pub use synthook_generator as generator;
pub use synthook_log as log;
pub use synthook_schema as schema;
pub use synthook_sinks as sinks;

use synthook_config::HarnessConfig;
use synthook_dispatcher::Dispatcher;

/// Wire a dispatcher from a loaded config, reading the API key from the
/// environment
pub async fn connect(config: &HarnessConfig) -> Result<Dispatcher> {
    HarnessBuilder::new(config)
        .api_key(config.api_key())
        .build()
        .await
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{HarnessBuilder, ScenarioCatalog, connect};
    pub use synthook_config::HarnessConfig;
    pub use synthook_dispatcher::{
        Dispatcher, ScenarioRequest, SimulationOutcome, SimulationState, SimulationStatus,
    };
    pub use synthook_generator::PayloadGenerator;
    pub use synthook_schema::{EventType, SchemaRegistry, ValidatedPayload};
    pub use synthook_sinks::{Sink, SinkConfig, SinkId, SinkKind};
}
