//! Dispatcher settings

use crate::BuildError;
use std::time::Duration;

/// Settings for a [`Dispatcher`](crate::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Extra generation rounds after a generation or validation failure
    pub max_regenerations: u32,

    /// Budget for a single generation call
    pub generation_timeout: Duration,

    /// Overall budget for requests that carry no deadline of their own
    pub default_deadline: Option<Duration>,

    /// Concurrent generation calls
    pub generation_concurrency: usize,

    /// Concurrent deliveries
    pub delivery_concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_regenerations: 1,
            generation_timeout: Duration::from_secs(30),
            default_deadline: Some(Duration::from_secs(120)),
            generation_concurrency: 4,
            delivery_concurrency: 8,
        }
    }
}

impl DispatchConfig {
    pub(crate) fn check(&self) -> Result<(), BuildError> {
        if self.generation_timeout.is_zero() {
            return Err(BuildError::InvalidSetting(
                "generation_timeout must be greater than zero".to_string(),
            ));
        }
        if self.default_deadline.is_some_and(|d| d.is_zero()) {
            return Err(BuildError::InvalidSetting(
                "default_deadline must be greater than zero".to_string(),
            ));
        }
        if self.generation_concurrency == 0 || self.delivery_concurrency == 0 {
            return Err(BuildError::InvalidSetting(
                "concurrency limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.max_regenerations, 1);
        assert_eq!(config.generation_concurrency, 4);
        assert_eq!(config.delivery_concurrency, 8);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let config = DispatchConfig {
            delivery_concurrency: 0,
            ..Default::default()
        };
        assert!(config.check().is_err());

        let config = DispatchConfig {
            default_deadline: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(config.check().is_err());
    }
}
