//! Coordinator and storage configuration.

use crate::retry::DeliveryRetry;
use std::path::PathBuf;
use std::time::Duration;

/// Tuning knobs for the coordinator's tab fan-out.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Retry policy applied per tab after an agent injection.
    pub delivery: DeliveryRetry,
    /// How many tabs are updated concurrently during a fan-out.
    pub fanout_concurrency: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryRetry::default(),
            fanout_concurrency: 8,
        }
    }
}

/// Throttling applied to persisted-store writes.
///
/// Synced stores enforce a sustained write quota, and some pages generate
/// bursts of state changes well above it.
#[derive(Debug, Clone)]
pub struct WriteThrottle {
    /// Burst capacity before writes start coalescing.
    pub burst: u32,
    /// Sustained writes per second.
    pub per_second: f64,
}

impl Default for WriteThrottle {
    fn default() -> Self {
        Self {
            burst: 4,
            per_second: 2.0,
        }
    }
}

impl WriteThrottle {
    /// Minimum spacing between sustained writes.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.per_second)
    }
}

/// Data directory for the persisted record, with fallback
pub fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("clarify");
    }

    // Fallback to current directory
    PathBuf::from(".clarify")
}
