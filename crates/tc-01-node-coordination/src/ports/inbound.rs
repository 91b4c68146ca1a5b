//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::CoordinationError;
use async_trait::async_trait;
use shared_bus::StreamSink;
use shared_types::{Node, NodeInfo};
use std::sync::Arc;

/// Primary Node Coordination API
#[async_trait]
pub trait NodeCoordinationApi: Send + Sync {
    /// Register a worker, or re-register a known one.
    ///
    /// `node_key` wins over `info.key` when both are set.
    async fn register(&self, node_key: &str, info: NodeInfo) -> Result<Node, CoordinationError>;

    /// Mark a registered node online and refresh its active timestamp.
    async fn heartbeat(&self, node_key: &str) -> Result<Node, CoordinationError>;

    /// Liveness probe. Touches no state.
    fn ping(&self, node_key: &str);

    /// Register the node's control stream and hold it open until the node
    /// is unsubscribed or the stream goes away.
    async fn subscribe(
        &self,
        node_key: &str,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), CoordinationError>;

    /// Release a subscribed node. Never blocks.
    fn unsubscribe(&self, node_key: &str) -> Result<(), CoordinationError>;
}
