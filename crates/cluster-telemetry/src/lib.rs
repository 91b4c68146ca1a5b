//! # Cluster Telemetry
//!
//! Logging and metrics for the task cluster.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered as JSON lines or pretty text
//! - **Metrics**: Prometheus counters and gauges, scraped at `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cluster_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TC_SERVICE_NAME` | `task-cluster` | Service name in logs |
//! | `TC_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `TC_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `TC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, DELEGATE_CALLS, DELEGATE_DURATION, MESSAGES_ROUTED,
    NODES_MARKED_OFFLINE, NODES_REGISTERED, NODE_HEARTBEATS, REGISTRY_SUBSCRIPTIONS,
    SUBSYSTEM_ERRORS, TELEMETRY_LOGS, TELEMETRY_RECORDS, TELEMETRY_REJECTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for adding to a counter.
#[macro_export]
macro_rules! metric_add {
    ($metric:expr, $value:expr) => {
        $metric.inc_by($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).inc_by($value)
    };
}

/// Record an error against a subsystem.
#[macro_export]
macro_rules! record_error {
    ($subsystem:expr, $error_type:expr) => {
        $crate::SUBSYSTEM_ERRORS
            .with_label_values(&[$subsystem, $error_type])
            .inc()
    };
}
