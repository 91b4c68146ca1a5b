//! Prometheus metrics for the task cluster.
//!
//! All metrics follow the naming convention: `tc_<area>_<metric>_<unit>`
//!
//! Counters can be bumped before [`register_metrics`] runs; registration
//! only makes them visible to [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // NODE COORDINATION (tc-01)
    // =========================================================================

    /// Registration attempts by outcome
    pub static ref NODES_REGISTERED: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_nodes_registered_total", "Node registration attempts"),
        &["outcome"]  // outcome: created/updated/rejected/failed
    ).expect("metric creation failed");

    /// Heartbeats by outcome
    pub static ref NODE_HEARTBEATS: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_node_heartbeats_total", "Node heartbeats received"),
        &["outcome"]  // outcome: ok/not_found/unregistered/failed
    ).expect("metric creation failed");

    /// Nodes moved to offline by the monitor
    pub static ref NODES_MARKED_OFFLINE: IntCounter = IntCounter::new(
        "tc_nodes_marked_offline_total",
        "Nodes marked offline after missing heartbeats"
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIPTION REGISTRY
    // =========================================================================

    /// Live registry entries
    pub static ref REGISTRY_SUBSCRIPTIONS: IntGauge = IntGauge::new(
        "tc_registry_subscriptions",
        "Entries in the subscription registry"
    ).expect("metric creation failed");

    // =========================================================================
    // MESSAGE ROUTING (tc-02)
    // =========================================================================

    /// Routed sends by outcome
    pub static ref MESSAGES_ROUTED: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_messages_routed_total", "Send envelopes routed"),
        &["outcome"]  // outcome: delivered/not_found/write_failed
    ).expect("metric creation failed");

    // =========================================================================
    // MODEL DELEGATE (tc-03)
    // =========================================================================

    /// Delegate calls
    pub static ref DELEGATE_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_delegate_calls_total", "Delegate calls executed"),
        &["model", "method", "outcome"]
    ).expect("metric creation failed");

    /// Delegate call duration
    pub static ref DELEGATE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "tc_delegate_call_duration_seconds",
            "Time spent executing delegate calls"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("bucket creation failed"))
    ).expect("metric creation failed");

    // =========================================================================
    // TASK TELEMETRY (tc-04)
    // =========================================================================

    /// Result rows forwarded to the stats store
    pub static ref TELEMETRY_RECORDS: IntCounter = IntCounter::new(
        "tc_telemetry_records_ingested_total",
        "Result records ingested"
    ).expect("metric creation failed");

    /// Log lines forwarded to the stats store
    pub static ref TELEMETRY_LOGS: IntCounter = IntCounter::new(
        "tc_telemetry_logs_ingested_total",
        "Log lines ingested"
    ).expect("metric creation failed");

    /// Stream messages dropped
    pub static ref TELEMETRY_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_telemetry_messages_rejected_total", "Telemetry messages rejected"),
        &["reason"]  // reason: decode/empty_task_id/invalid_code/stats
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Subsystem errors by type
    pub static ref SUBSYSTEM_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_subsystem_errors_total", "Errors by subsystem and type"),
        &["subsystem", "error_type"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Node coordination
        Box::new(NODES_REGISTERED.clone()),
        Box::new(NODE_HEARTBEATS.clone()),
        Box::new(NODES_MARKED_OFFLINE.clone()),
        Box::new(REGISTRY_SUBSCRIPTIONS.clone()),
        // Routing
        Box::new(MESSAGES_ROUTED.clone()),
        // Delegate
        Box::new(DELEGATE_CALLS.clone()),
        Box::new(DELEGATE_DURATION.clone()),
        // Telemetry ingestion
        Box::new(TELEMETRY_RECORDS.clone()),
        Box::new(TELEMETRY_LOGS.clone()),
        Box::new(TELEMETRY_REJECTED.clone()),
        // Errors
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
