//! # Node Directory
//!
//! CRUD and lifecycle mutations over node records in the model store.
//!
//! Every mutation is read-then-write against the store with no
//! compare-and-swap: two concurrent writers for the same node can interleave
//! and the last save wins.

use crate::domain::errors::CoordinationError;
use crate::ports::outbound::TimeSource;
use shared_store::{ListOptions, ModelStore, Query, StoreError};
use shared_types::{Model, Node, NodeStatus};
use std::sync::Arc;
use tracing::debug;

pub struct NodeDirectory {
    store: Arc<dyn ModelStore>,
    clock: Arc<dyn TimeSource>,
}

fn into_node(model: Model) -> Result<Node, CoordinationError> {
    Node::try_from(model).map_err(|other| {
        StoreError::Backend(format!("expected node, store returned {}", other.kind())).into()
    })
}

impl NodeDirectory {
    pub fn new(store: Arc<dyn ModelStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self { store, clock }
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        &self.clock
    }

    /// Look a node up by key. `Ok(None)` when no record exists.
    pub async fn get_node_by_key(&self, key: &str) -> Result<Option<Node>, CoordinationError> {
        match self.store.get_node_by_key(key).await {
            Ok(node) => Ok(Some(node)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn add(&self, node: Node) -> Result<Node, CoordinationError> {
        into_node(self.store.add(Model::from(node)).await?)
    }

    pub async fn save(&self, node: Node) -> Result<Node, CoordinationError> {
        into_node(self.store.save(Model::from(node)).await?)
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<Node>, CoordinationError> {
        self.store
            .get_list(shared_types::ModelKind::Node, query, ListOptions::default())
            .await?
            .into_iter()
            .map(into_node)
            .collect()
    }

    /// Apply a lifecycle transition and persist it.
    ///
    /// Going active refreshes the active timestamp; going inactive keeps the
    /// last one so the monitor can tell how long a node has been silent.
    pub async fn update_status(
        &self,
        mut node: Node,
        status: NodeStatus,
        active: bool,
    ) -> Result<Node, CoordinationError> {
        if !node.status.can_transition(status) {
            return Err(CoordinationError::InvalidTransition {
                key: node.key,
                from: node.status,
                to: status,
            });
        }
        let active_ts = active.then(|| self.clock.now());
        debug!(node_key = %node.key, from = node.status.as_str(), to = status.as_str(), "[tc-01] status change");
        node.set_status(status, active, active_ts);
        self.save(node).await
    }

    pub async fn set_online(&self, node: Node) -> Result<Node, CoordinationError> {
        self.update_status(node, NodeStatus::Online, true).await
    }

    pub async fn set_offline(&self, node: Node) -> Result<Node, CoordinationError> {
        self.update_status(node, NodeStatus::Offline, false).await
    }

    /// Create or refresh the master's own record.
    ///
    /// Registration refuses masters, so the master writes itself directly.
    pub async fn upsert_master(&self, mut master: Node) -> Result<Node, CoordinationError> {
        master.is_master = true;
        master.enabled = true;
        master.set_status(NodeStatus::Online, true, Some(self.clock.now()));
        if master.name.is_empty() {
            master.name = master.key.clone();
        }

        match self.get_node_by_key(&master.key).await? {
            Some(existing) => {
                master.id = existing.id;
                self.save(master).await
            }
            None => self.add(master).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::ManualTimeSource;
    use shared_store::InMemoryModelStore;

    fn directory() -> (NodeDirectory, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::default());
        let directory = NodeDirectory::new(Arc::new(InMemoryModelStore::new()), clock.clone());
        (directory, clock)
    }

    fn registered(key: &str) -> Node {
        Node {
            key: key.into(),
            status: NodeStatus::Registered,
            active: true,
            enabled: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_node_is_none() {
        let (directory, _) = directory();
        assert!(directory.get_node_by_key("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_online_refreshes_timestamp() {
        let (directory, clock) = directory();
        let node = directory.add(registered("w1")).await.unwrap();
        assert!(node.active_ts.is_none());

        let online = directory.set_online(node).await.unwrap();
        assert_eq!(online.status, NodeStatus::Online);
        assert_eq!(online.active_ts, Some(clock.now()));

        let stored = directory.get_node_by_key("w1").await.unwrap().unwrap();
        assert_eq!(stored, online);
    }

    #[tokio::test]
    async fn test_set_offline_keeps_timestamp() {
        let (directory, clock) = directory();
        let node = directory.add(registered("w1")).await.unwrap();
        let online = directory.set_online(node).await.unwrap();
        let seen = online.active_ts;

        clock.advance(chrono::Duration::seconds(120));
        let offline = directory.set_offline(online).await.unwrap();
        assert_eq!(offline.status, NodeStatus::Offline);
        assert!(!offline.active);
        assert_eq!(offline.active_ts, seen);
    }

    #[tokio::test]
    async fn test_unregistered_cannot_go_online() {
        let (directory, _) = directory();
        let node = directory
            .add(Node {
                key: "w1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let err = directory.set_online(node).await.unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_upsert_master_is_idempotent() {
        let (directory, _) = directory();
        let master = Node {
            key: "master".into(),
            ..Default::default()
        };
        let first = directory.upsert_master(master.clone()).await.unwrap();
        let second = directory.upsert_master(master).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.is_master);
        assert_eq!(second.status, NodeStatus::Online);
        assert_eq!(second.name, "master");

        let all = directory.list(&Query::new()).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
