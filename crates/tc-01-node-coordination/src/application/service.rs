//! # Node Coordination Service
//!
//! Registration, heartbeat, ping and the per-node control stream.
//!
//! ## Lifecycle
//!
//! ```text
//! [Unregistered] ──register──→ [Registered] ──heartbeat──→ [Online] ⇄ [Offline]
//! ```
//!
//! Control streams are registered under `node:<key>` so they never collide
//! with message-bus endpoints sharing the same registry.

use crate::application::directory::NodeDirectory;
use crate::domain::errors::CoordinationError;
use crate::ports::inbound::NodeCoordinationApi;
use async_trait::async_trait;
use cluster_telemetry::{metric_inc, record_error, NODES_REGISTERED, NODE_HEARTBEATS, REGISTRY_SUBSCRIPTIONS};
use shared_bus::{finished_signal, node_key, StreamSink, Subscription, SubscriptionRegistry};
use shared_store::StoreError;
use shared_types::{Node, NodeInfo, NodeStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct NodeCoordinationService {
    directory: Arc<NodeDirectory>,
    registry: Arc<SubscriptionRegistry>,
}

impl NodeCoordinationService {
    pub fn new(directory: Arc<NodeDirectory>, registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            directory,
            registry,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<NodeDirectory> {
        &self.directory
    }

    async fn register_inner(&self, node_key: &str, info: NodeInfo) -> Result<(Node, bool), CoordinationError> {
        if info.is_master {
            return Err(CoordinationError::NotAllowed(info.key));
        }

        let key = if node_key.is_empty() {
            info.key.as_str()
        } else {
            node_key
        };
        if key.is_empty() {
            return Err(CoordinationError::MissingIdentity);
        }

        if let Some(existing) = self.directory.get_node_by_key(key).await? {
            return self.reregister(key, existing).await.map(|node| (node, false));
        }

        let name = if info.name.is_empty() {
            key.to_string()
        } else {
            info.name
        };
        let node = Node {
            key: key.to_string(),
            name,
            ip: info.ip,
            hostname: info.hostname,
            description: info.description,
            max_runners: info.max_runners,
            is_master: false,
            status: NodeStatus::Registered,
            active: true,
            enabled: true,
            ..Default::default()
        };
        match self.directory.add(node).await {
            Ok(node) => {
                info!(node_key = %key, id = ?node.id, "[tc-01] added worker");
                Ok((node, true))
            }
            // Lost a race with a concurrent first registration of the same key.
            Err(CoordinationError::Store(StoreError::DuplicateKey { .. })) => {
                debug!(node_key = %key, "[tc-01] node created concurrently, updating it");
                let existing = self
                    .directory
                    .get_node_by_key(key)
                    .await?
                    .ok_or_else(|| CoordinationError::NodeNotFound(key.to_string()))?;
                self.reregister(key, existing).await.map(|node| (node, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn reregister(&self, key: &str, mut existing: Node) -> Result<Node, CoordinationError> {
        if existing.is_master {
            return Err(CoordinationError::NotAllowed(key.to_string()));
        }
        existing.status = NodeStatus::Registered;
        existing.active = true;
        let node = self.directory.save(existing).await?;
        info!(node_key = %key, id = ?node.id, "[tc-01] updated worker");
        Ok(node)
    }

    async fn heartbeat_inner(&self, node_key: &str) -> Result<Node, CoordinationError> {
        let node = self
            .directory
            .get_node_by_key(node_key)
            .await?
            .ok_or_else(|| CoordinationError::NodeNotFound(node_key.to_string()))?;

        if node.status == NodeStatus::Unregistered {
            return Err(CoordinationError::NodeUnregistered(node_key.to_string()));
        }

        self.directory.set_online(node).await
    }
}

#[async_trait]
impl NodeCoordinationApi for NodeCoordinationService {
    async fn register(&self, node_key: &str, info: NodeInfo) -> Result<Node, CoordinationError> {
        match self.register_inner(node_key, info).await {
            Ok((node, created)) => {
                metric_inc!(NODES_REGISTERED, &[if created { "created" } else { "updated" }]);
                info!(node_key = %node.key, "[tc-01] master registered worker");
                Ok(node)
            }
            Err(e) => {
                let outcome = match e {
                    CoordinationError::Store(_) => "failed",
                    _ => "rejected",
                };
                metric_inc!(NODES_REGISTERED, &[outcome]);
                record_error!("tc-01", e.label());
                warn!(node_key = %node_key, error = %e, "[tc-01] registration refused");
                Err(e)
            }
        }
    }

    async fn heartbeat(&self, node_key: &str) -> Result<Node, CoordinationError> {
        let result = self.heartbeat_inner(node_key).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(CoordinationError::NodeNotFound(_)) => "not_found",
            Err(CoordinationError::NodeUnregistered(_)) => "unregistered",
            Err(_) => "failed",
        };
        metric_inc!(NODE_HEARTBEATS, &[outcome]);
        match &result {
            Ok(_) => debug!(node_key = %node_key, "[tc-01] heartbeat"),
            Err(e) => {
                record_error!("tc-01", e.label());
                warn!(node_key = %node_key, error = %e, "[tc-01] heartbeat rejected");
            }
        }
        result
    }

    fn ping(&self, node_key: &str) {
        debug!(node_key = %node_key, "[tc-01] ping");
    }

    async fn subscribe(
        &self,
        node_key: &str,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), CoordinationError> {
        info!(node_key = %node_key, "[tc-01] subscribe request");

        let (finished, mut listener) = finished_signal();
        self.registry
            .set(shared_bus::node_key(node_key), Subscription::new(sink.clone(), finished));
        REGISTRY_SUBSCRIPTIONS.set(self.registry.len() as i64);
        info!(node_key = %node_key, "[tc-01] node subscribed");

        tokio::select! {
            () = listener.wait() => {
                info!(node_key = %node_key, "[tc-01] closing stream");
            }
            () = sink.closed() => {
                info!(node_key = %node_key, "[tc-01] node disconnected");
            }
        }
        Ok(())
    }

    fn unsubscribe(&self, key: &str) -> Result<(), CoordinationError> {
        let registry_key = node_key(key);
        let subscription = self.registry.get(&registry_key).map_err(|e| {
            record_error!("tc-01", "subscribe_not_found");
            CoordinationError::from(e)
        })?;

        if subscription.finish() {
            info!(node_key = %key, "[tc-01] unsubscribed node");
        } else {
            debug!(node_key = %key, "[tc-01] no listener for finished signal");
        }
        self.registry.delete(&registry_key);
        REGISTRY_SUBSCRIPTIONS.set(self.registry.len() as i64);
        Ok(())
    }
}
