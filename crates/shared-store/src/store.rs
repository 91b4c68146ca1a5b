//! # Model Store Port (Driven Port)
//!
//! The authoritative document store as seen by the control plane. Every call
//! is one atomic single-document operation; there is no multi-document
//! transaction and no compare-and-swap.
//!
//! Production deployments back this with a document database. The master
//! runtime and the tests use [`InMemoryModelStore`](crate::InMemoryModelStore).

use crate::error::StoreError;
use crate::query::{ListOptions, Query};
use async_trait::async_trait;
use shared_types::{Artifact, Model, ModelKind, Node, ObjectId};

#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Fetch one entity by identity.
    async fn get_by_id(&self, kind: ModelKind, id: ObjectId) -> Result<Model, StoreError>;

    /// Fetch the first entity matching `query`.
    async fn get(&self, kind: ModelKind, query: &Query) -> Result<Model, StoreError>;

    /// Fetch every entity matching `query`, ordered by identity.
    async fn get_list(
        &self,
        kind: ModelKind,
        query: &Query,
        options: ListOptions,
    ) -> Result<Vec<Model>, StoreError>;

    /// Insert a new entity. Assigns an identity when absent and returns the
    /// stored record.
    async fn add(&self, model: Model) -> Result<Model, StoreError>;

    /// Replace an existing entity by identity.
    async fn save(&self, model: Model) -> Result<Model, StoreError>;

    /// Remove an entity by identity.
    async fn delete(&self, kind: ModelKind, id: ObjectId) -> Result<(), StoreError>;

    /// Audit record of an entity.
    async fn get_artifact(&self, kind: ModelKind, id: ObjectId) -> Result<Artifact, StoreError>;

    /// Node lookup by its cluster key.
    async fn get_node_by_key(&self, key: &str) -> Result<Node, StoreError> {
        let model = self
            .get(ModelKind::Node, &Query::new().eq("key", key))
            .await?;
        Node::try_from(model).map_err(|other| {
            StoreError::Backend(format!("expected node, store returned {}", other.kind()))
        })
    }
}
