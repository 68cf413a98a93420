//! Scenario Dispatch for Synthook
//!
//! The dispatcher owns the per-request pipeline: resolve the event type,
//! generate a candidate payload, validate it against the registry, and
//! deliver it through the selected sink. Every call ends in a
//! [`SimulationOutcome`], whether it succeeded or not.
//!
//! ```text
//! Received -> Generating -> Validating -> Delivering -> Succeeded
//!                 ^              |              \
//!                 +-- regenerate-+               +--> Failed
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use synthook_dispatcher::{Dispatcher, ScenarioRequest};
//! use synthook_generator::mock::ExampleEchoGenerator;
//! use synthook_sinks::{HttpSink, SinkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::builder()
//!         .generator(Arc::new(ExampleEchoGenerator))
//!         .sink(
//!             SinkConfig::http("local", "http://localhost:8080/webhook"),
//!             Arc::new(HttpSink::new("Synthook/0.1")?),
//!         )
//!         .build()?;
//!
//!     let outcome = dispatcher
//!         .simulate(ScenarioRequest::new("cash-in of 1000 BRL, confirmed", "local"))
//!         .await;
//!     println!("{}", serde_json::to_string(&outcome)?);
//!     Ok(())
//! }
//! ```

mod builder;
mod config;
mod dispatcher;
mod error;
mod outcome;
mod request;
mod state;

pub use builder::DispatcherBuilder;
pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{BuildError, RequestError};
pub use outcome::{
    DeliveryReceipt, ErrorDetail, FailureCause, FailureStage, SimulationOutcome,
    SimulationStatus,
};
pub use request::ScenarioRequest;
pub use state::SimulationState;
