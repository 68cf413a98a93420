//! Errors raised while wiring a harness from configuration

use synthook_config::ConfigError;
use synthook_dispatcher::BuildError;
use synthook_schema::ExampleStoreError;
use thiserror::Error;

/// Startup failures; all of them are fatal
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load examples: {0}")]
    Examples(#[from] ExampleStoreError),

    #[error("Failed to build dispatcher: {0}")]
    Build(#[from] BuildError),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Unknown sink '{0}'")]
    UnknownSink(String),

    #[error("No sinks configured")]
    NoSinks,
}

pub type Result<T> = std::result::Result<T, HarnessError>;
