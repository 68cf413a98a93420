// Environment variable overrides

use crate::HarnessConfig;
use std::collections::HashMap;
use std::env;
use tracing::debug;

/// Prefix of harness environment variables
pub const ENV_PREFIX: &str = "SYNTHOOK";

/// Collects `PREFIX_*` variables and applies them over a loaded config
pub struct EnvLoader {
    vars: HashMap<String, String>,
}

impl EnvLoader {
    /// Read variables with the given prefix from the process environment
    pub fn new(prefix: &str) -> Self {
        Self::from_vars(prefix, env::vars())
    }

    /// Read variables with the given prefix from an explicit list
    pub fn from_vars<I, K, V>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let head = format!("{prefix}_");
        let vars = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.into();
                key.strip_prefix(&head)
                    .map(|rest| (rest.to_lowercase(), value.into()))
            })
            .collect();

        Self { vars }
    }

    /// Get a variable by its name without prefix, case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Apply the supported overrides
    ///
    /// Values that fail to parse are ignored; validation runs afterwards.
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(model) = self.get("generator_model") {
            config.generator.model = model.to_string();
        }
        if let Some(endpoint) = self.get("generator_endpoint") {
            config.generator.endpoint = endpoint.to_string();
        }
        if let Some(var) = self.get("generator_api_key_env") {
            config.generator.api_key_env = var.to_string();
        }
        if let Some(temperature) = self.get("generator_temperature").and_then(|v| v.parse().ok()) {
            config.generator.temperature = temperature;
        }
        if let Some(max) = self
            .get("dispatch_max_regenerations")
            .and_then(|v| v.parse().ok())
        {
            config.dispatch.max_regenerations = max;
        }
        if let Some(region) = self.get("aws_region") {
            config.aws.region = Some(region.to_string());
        }
        if let Some(endpoint) = self.get("aws_endpoint_url") {
            config.aws.endpoint_url = Some(endpoint.to_string());
        }

        debug!(variables = self.vars.len(), "Applied environment overrides");
    }
}
