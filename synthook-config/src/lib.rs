// Configuration loading for the Synthook harness
//
// A harness config is read from a TOML or JSON file, overlaid with
// `SYNTHOOK_*` environment variables and validated before use. Secrets are
// never stored in the file: the generator API key is read from the variable
// named by `generator.api_key_env`.

pub mod env;
pub mod error;
pub mod harness;
pub mod loader;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use harness::{
    AwsSettings, DispatchSettings, EventTypeSettings, GeneratorSettings, HarnessConfig,
    RetrySettings, SinkSettings,
};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Load a harness config file, apply environment overrides and validate
///
/// A `.env` file in the working directory is read first if present.
pub fn load(path: impl AsRef<Path>) -> Result<HarnessConfig> {
    load_dotenv(None)?;
    load_with(path, &EnvLoader::new(ENV_PREFIX))
}

/// Like [`load`], with an explicit set of environment overrides
pub fn load_with(path: impl AsRef<Path>, overrides: &EnvLoader) -> Result<HarnessConfig> {
    let path = path.as_ref();
    let value = ConfigLoader::auto(path)?.load_file(path)?;

    let mut config = from_value(value)?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    overrides.apply(&mut config);
    config.validate()?;

    info!(
        path = %path.display(),
        sinks = config.sinks.len(),
        event_types = config.event_types.len(),
        "Loaded harness configuration"
    );
    Ok(config)
}

/// Parse and validate config text without touching the environment
pub fn from_str(content: &str, format: FileFormat) -> Result<HarnessConfig> {
    let value = ConfigLoader::new(format).parse(content)?;
    let config = from_value(value)?;
    config.validate()?;
    Ok(config)
}

/// Load a `.env` file into the process environment
///
/// Without a path a missing `.env` is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        }
        None => {
            if let Ok(found) = dotenvy::dotenv() {
                debug!(path = %found.display(), "Loaded .env file");
            }
        }
    }
    Ok(())
}

fn from_value(value: Value) -> Result<HarnessConfig> {
    serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
}
