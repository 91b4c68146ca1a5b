//! Configuration for Node Coordination

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Liveness monitor configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Online nodes silent for longer than this are marked offline
    pub heartbeat_timeout_secs: u64,
    /// How often the monitor scans
    pub monitor_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: 60,
            monitor_interval_secs: 15,
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    #[must_use]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}
