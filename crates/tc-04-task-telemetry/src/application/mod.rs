//! Application services for Task Telemetry.

pub mod service;

pub use service::TaskTelemetryService;
