//! # In-Memory Model Store
//!
//! One `BTreeMap` per collection behind a single `parking_lot::RwLock`.
//! Artifacts are kept alongside and updated in the same critical section as
//! the entity they track, so `add`/`save`/`delete` stay atomic. Node keys
//! are unique: `add` checks for an existing key in the same critical section.

use crate::error::StoreError;
use crate::query::{ListOptions, Query};
use crate::store::ModelStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use shared_types::{Artifact, Model, ModelKind, ObjectId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Default)]
struct Collections {
    models: HashMap<ModelKind, BTreeMap<ObjectId, Model>>,
    artifacts: BTreeMap<ObjectId, Artifact>,
}

/// Process-local store.
#[derive(Default)]
pub struct InMemoryModelStore {
    inner: RwLock<Collections>,
}

impl InMemoryModelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of `kind`.
    #[must_use]
    pub fn count(&self, kind: ModelKind) -> usize {
        self.inner
            .read()
            .models
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    fn to_document(model: &Model) -> Result<Value, StoreError> {
        let bytes = model.encode()?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn touch_artifact(collections: &mut Collections, kind: ModelKind, id: ObjectId, created: bool) {
        if kind == ModelKind::Artifact {
            return;
        }
        let now = Utc::now();
        let artifact = collections.artifacts.entry(id).or_insert_with(|| Artifact {
            id: Some(id),
            col: kind.collection().to_string(),
            ..Default::default()
        });
        if created {
            artifact.create_ts = Some(now);
            artifact.deleted = false;
            artifact.delete_ts = None;
        }
        artifact.update_ts = Some(now);
    }
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn get_by_id(&self, kind: ModelKind, id: ObjectId) -> Result<Model, StoreError> {
        self.inner
            .read()
            .models
            .get(&kind)
            .and_then(|col| col.get(&id))
            .cloned()
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn get(&self, kind: ModelKind, query: &Query) -> Result<Model, StoreError> {
        let list = self.get_list(kind, query, ListOptions::page(0, 1)).await?;
        list.into_iter().next().ok_or(StoreError::NoMatch { kind })
    }

    async fn get_list(
        &self,
        kind: ModelKind,
        query: &Query,
        options: ListOptions,
    ) -> Result<Vec<Model>, StoreError> {
        let guard = self.inner.read();
        let Some(col) = guard.models.get(&kind) else {
            return Ok(Vec::new());
        };

        let limit = options.limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        let mut skipped = 0;
        for model in col.values() {
            if out.len() >= limit {
                break;
            }
            if !query.is_empty() && !query.matches(&Self::to_document(model)?) {
                continue;
            }
            if skipped < options.skip {
                skipped += 1;
                continue;
            }
            out.push(model.clone());
        }
        Ok(out)
    }

    async fn add(&self, mut model: Model) -> Result<Model, StoreError> {
        let kind = model.kind();
        let id = match model.id() {
            Some(id) if !id.is_zero() => id,
            _ => {
                let id = ObjectId::new();
                model.set_id(id);
                id
            }
        };

        let mut guard = self.inner.write();
        let col = guard.models.entry(kind).or_default();
        if col.contains_key(&id) {
            return Err(StoreError::Duplicate { kind, id });
        }
        if let Model::Node(node) = &model {
            let taken = !node.key.is_empty()
                && col
                    .values()
                    .any(|m| matches!(m, Model::Node(other) if other.key == node.key));
            if taken {
                return Err(StoreError::DuplicateKey {
                    kind,
                    key: node.key.clone(),
                });
            }
        }
        col.insert(id, model.clone());
        Self::touch_artifact(&mut guard, kind, id, true);
        debug!(kind = %kind, id = %id, "store: added");
        Ok(model)
    }

    async fn save(&self, model: Model) -> Result<Model, StoreError> {
        let kind = model.kind();
        let id = model
            .id()
            .filter(|id| !id.is_zero())
            .ok_or(StoreError::MissingId { kind })?;

        let mut guard = self.inner.write();
        let slot = guard
            .models
            .get_mut(&kind)
            .and_then(|col| col.get_mut(&id))
            .ok_or(StoreError::NotFound { kind, id })?;
        *slot = model.clone();
        Self::touch_artifact(&mut guard, kind, id, false);
        debug!(kind = %kind, id = %id, "store: saved");
        Ok(model)
    }

    async fn delete(&self, kind: ModelKind, id: ObjectId) -> Result<(), StoreError> {
        let mut guard = self.inner.write();
        guard
            .models
            .get_mut(&kind)
            .and_then(|col| col.remove(&id))
            .ok_or(StoreError::NotFound { kind, id })?;
        if let Some(artifact) = guard.artifacts.get_mut(&id) {
            let now = Utc::now();
            artifact.deleted = true;
            artifact.delete_ts = Some(now);
            artifact.update_ts = Some(now);
        }
        debug!(kind = %kind, id = %id, "store: deleted");
        Ok(())
    }

    async fn get_artifact(&self, kind: ModelKind, id: ObjectId) -> Result<Artifact, StoreError> {
        self.inner
            .read()
            .artifacts
            .get(&id)
            .filter(|a| a.col == kind.collection())
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: ModelKind::Artifact,
                id,
            })
    }
}
