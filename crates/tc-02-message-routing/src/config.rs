//! Configuration for Message Routing

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Outbound queue depth per connected endpoint
    pub stream_buffer: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            stream_buffer: shared_bus::DEFAULT_STREAM_BUFFER,
        }
    }
}
