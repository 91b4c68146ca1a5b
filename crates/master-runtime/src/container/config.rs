//! # Runtime Configuration
//!
//! Everything the master needs at startup, read from `TC_*` environment
//! variables with sane defaults.

use std::net::SocketAddr;
use std::time::Duration;
use tc_01_node_coordination::MonitorConfig;
use tc_02_message_routing::RoutingConfig;
use tc_04_task_telemetry::IngestConfig;
use thiserror::Error;
use tracing::warn;

use crate::adapters::StatsRetention;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9666";

/// Default key of the master's own node record.
pub const DEFAULT_MASTER_KEY: &str = "master";

/// Default upper bound for one frame or unary body (4 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: SocketAddr,
    /// Key under which the master registers itself.
    pub master_key: String,
    pub monitor: MonitorConfig,
    pub routing: RoutingConfig,
    pub ingest: IngestConfig,
    /// Frames and request bodies above this size are rejected.
    pub max_frame_bytes: usize,
    /// How much task output the in-memory stats adapter keeps.
    pub stats_retention: StatsRetention,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9666)),
            master_key: DEFAULT_MASTER_KEY.to_string(),
            monitor: MonitorConfig::default(),
            routing: RoutingConfig::default(),
            ingest: IngestConfig::default(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            stats_retention: StatsRetention::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Stream buffer must be non-zero")]
    ZeroBuffer,

    #[error("Monitor interval must be non-zero")]
    ZeroMonitorInterval,

    #[error("Heartbeat timeout ({timeout:?}) shorter than monitor interval ({interval:?})")]
    TimeoutBelowInterval { timeout: Duration, interval: Duration },

    #[error("Master key must not be empty")]
    EmptyMasterKey,
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(None),
    }
}

impl RuntimeConfig {
    /// Defaults overridden by whatever `TC_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = parse_var::<SocketAddr>("TC_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Ok(key) = std::env::var("TC_MASTER_KEY") {
            config.master_key = key;
        }
        if let Some(secs) = parse_var("TC_HEARTBEAT_TIMEOUT_SECS")? {
            config.monitor.heartbeat_timeout_secs = secs;
        }
        if let Some(secs) = parse_var("TC_MONITOR_INTERVAL_SECS")? {
            config.monitor.monitor_interval_secs = secs;
        }
        if let Some(buffer) = parse_var("TC_STREAM_BUFFER")? {
            config.routing.stream_buffer = buffer;
        }
        if let Some(bytes) = parse_var("TC_MAX_FRAME_BYTES")? {
            config.max_frame_bytes = bytes;
        }
        if let Some(n) = parse_var("TC_STATS_RETAINED_PER_TASK")? {
            config.stats_retention.per_task = n;
        }
        if let Some(n) = parse_var("TC_STATS_RETAINED_TASKS")? {
            config.stats_retention.tasks = n;
        }
        if let Ok(field) = std::env::var("TC_RECORD_ID_FIELD") {
            if field.is_empty() {
                warn!("TC_RECORD_ID_FIELD is empty, keeping {}", config.ingest.record_id_field);
            } else {
                config.ingest.record_id_field = field;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.master_key.is_empty() {
            return Err(ConfigError::EmptyMasterKey);
        }
        if self.routing.stream_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }
        let interval = self.monitor.monitor_interval();
        if interval.is_zero() {
            return Err(ConfigError::ZeroMonitorInterval);
        }
        let timeout = self.monitor.heartbeat_timeout();
        if timeout < interval {
            return Err(ConfigError::TimeoutBelowInterval { timeout, interval });
        }
        Ok(())
    }
}
