//! Result of a full delivery

use crate::DeliveryError;
use std::time::Duration;

/// Terminal result of delivering one payload through a sink
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// The sink accepted the payload
    Delivered {
        /// Receiver's or broker's identifier for the delivery
        delivery_id: String,
        /// Attempts made, the successful one included
        attempts: u32,
        /// Time from the first attempt to the acknowledgment
        latency: Duration,
    },

    /// Delivery gave up
    Failed {
        /// Error of the last attempt
        error: DeliveryError,
        /// Attempts made
        attempts: u32,
        /// Whether the retry budget ran out
        exhausted: bool,
    },
}

impl DeliveryOutcome {
    /// Check if the payload was delivered
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    /// Delivery id on success
    pub fn delivery_id(&self) -> Option<&str> {
        match self {
            Self::Delivered { delivery_id, .. } => Some(delivery_id),
            Self::Failed { .. } => None,
        }
    }

    /// Error on failure
    pub fn error(&self) -> Option<&DeliveryError> {
        match self {
            Self::Delivered { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let ok = DeliveryOutcome::Delivered {
            delivery_id: "d-1".to_string(),
            attempts: 2,
            latency: Duration::from_millis(5),
        };
        assert!(ok.is_delivered());
        assert_eq!(ok.attempts(), 2);
        assert_eq!(ok.delivery_id(), Some("d-1"));
        assert!(ok.error().is_none());

        let failed = DeliveryOutcome::Failed {
            error: DeliveryError::Canceled,
            attempts: 1,
            exhausted: false,
        };
        assert!(!failed.is_delivered());
        assert_eq!(failed.error(), Some(&DeliveryError::Canceled));
    }
}
