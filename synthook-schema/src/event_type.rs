//! Event type tags

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Category of simulated webhook, e.g. `cash-in` or `cash-out`
///
/// Names are normalized to trimmed lowercase so that configuration and
/// request hints compare equal regardless of casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Name of the built-in incoming Pix transfer type
    pub const CASH_IN: &'static str = "cash-in";

    /// Name of the built-in outgoing Pix transfer type
    pub const CASH_OUT: &'static str = "cash-out";

    /// Create an event type from its name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// The built-in `cash-in` type
    pub fn cash_in() -> Self {
        Self::new(Self::CASH_IN)
    }

    /// The built-in `cash-out` type
    pub fn cash_out() -> Self {
        Self::new(Self::CASH_OUT)
    }

    /// Get the normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keywords derived from the name itself (`cash-in` gives `cash-in`,
    /// `cash in` and `cashin`)
    pub(crate) fn name_keywords(&self) -> Vec<String> {
        let mut keywords = vec![self.0.clone()];
        for variant in [self.0.replace(['-', '_'], " "), self.0.replace(['-', '_'], "")] {
            if !keywords.contains(&variant) {
                keywords.push(variant);
            }
        }
        keywords
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(name))
    }
}
