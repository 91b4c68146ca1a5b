//! Inbound Ports (Driving Ports / API)

use crate::domain::IngestError;
use async_trait::async_trait;
use shared_bus::StreamSource;
use shared_types::StreamMessage;

#[async_trait]
pub trait TaskTelemetryApi: Send + Sync {
    /// Consume a worker's telemetry stream until it ends.
    ///
    /// Bad messages are dropped one at a time; only a transport failure
    /// ends the stream with an error.
    async fn subscribe(&self, source: &mut dyn StreamSource) -> Result<(), IngestError>;

    /// Handle one `InsertData` / `InsertLogs` envelope.
    async fn ingest(&self, msg: StreamMessage) -> Result<(), IngestError>;
}
