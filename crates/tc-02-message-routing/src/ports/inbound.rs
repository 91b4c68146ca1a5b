//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::RoutingError;
use async_trait::async_trait;
use shared_bus::{StreamSink, StreamSource};
use shared_types::StreamMessage;
use std::sync::Arc;

#[async_trait]
pub trait MessageRoutingApi: Send + Sync {
    /// Serve one connected endpoint until it disconnects or its stream ends.
    ///
    /// Clean end-of-stream and cancellation return `Ok`; any other receive
    /// error is returned.
    async fn connect(
        &self,
        source: &mut dyn StreamSource,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), RoutingError>;

    /// Deliver a `Send` envelope to its destination.
    async fn route(&self, msg: StreamMessage) -> Result<(), RoutingError>;
}
