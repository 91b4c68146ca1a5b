//! # TC-04: Task Telemetry Subsystem
//!
//! Receives the result rows and log lines workers stream while tasks run and
//! forwards them, batch by batch, to the stats store.
//!
//! ```text
//! worker ──InsertData/InsertLogs──► [TaskTelemetryService] ──► TaskStatsStore
//! ```
//!
//! Result rows whose `_tid` field holds a hex id string get that field
//! promoted to a native id before persistence; malformed ids are kept as
//! plain strings.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::TaskTelemetryService;
pub use config::{IngestConfig, DEFAULT_RECORD_ID_FIELD};
pub use domain::{normalize_record, IngestError};
pub use ports::{TaskStatsStore, TaskTelemetryApi};
