//! Delivery retry policy.
//!
//! Tab delivery uses a single retry after a fixed short delay: the delay
//! bridges the race between "agent code injected" and "agent's listener
//! registered". There is deliberately no backoff; after the one retry the
//! failure is permanent for that command and the tab stays unsynced until
//! its next lifecycle event.

use std::time::Duration;

/// Retry policy for delivering an effect message to one tab.
#[derive(Debug, Clone)]
pub struct DeliveryRetry {
    /// Total attempts (1 = no retry).
    pub max_attempts: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for DeliveryRetry {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(150),
        }
    }
}

impl DeliveryRetry {
    /// Policy for no retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before a given attempt (1-indexed; the first attempt is free).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.delay
        }
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
