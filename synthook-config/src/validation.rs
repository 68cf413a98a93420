// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{field} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that a number is within an inclusive range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display,
    {
        if !(value >= min && value <= max) {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }

    /// Validate that a number is at least `min`
    pub fn at_least<T>(value: T, min: T, field: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display,
    {
        if !(value >= min) {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be at least {min}, got {value}"
            )));
        }
        Ok(())
    }

    /// Validate an absolute http(s) URL
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{field} must be a valid http(s) URL, got '{value}'"
            ))),
        }
    }
}
