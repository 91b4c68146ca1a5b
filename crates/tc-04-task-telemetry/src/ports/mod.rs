pub mod inbound;
pub mod outbound;

pub use inbound::TaskTelemetryApi;
pub use outbound::TaskStatsStore;
