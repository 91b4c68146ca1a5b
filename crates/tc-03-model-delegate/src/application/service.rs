//! # Model Delegate Service
//!
//! Applies remote mutations to the authoritative store.
//!
//! | Method | Store call | Returns |
//! |--------|------------|---------|
//! | `Add` | `add` | stored entity (with assigned id) |
//! | `Save` | `save` | stored entity |
//! | `Delete` | `delete` | entity as sent |
//! | `Refresh` | `get_by_id` | stored entity, sent fields ignored |
//! | `GetDerived` | `get_by_id` + `get_artifact` | artifact |

use crate::domain::{DelegateError, DelegateOutcome};
use crate::ports::inbound::ModelDelegateApi;
use async_trait::async_trait;
use cluster_telemetry::{metric_inc, record_error, time_histogram, DELEGATE_CALLS, DELEGATE_DURATION};
use shared_store::ModelStore;
use shared_types::{DelegateMessage, DelegateMethod, Model, ModelKind, ObjectId};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ModelDelegateService {
    store: Arc<dyn ModelStore>,
}

fn identity(model: &Model) -> Result<ObjectId, DelegateError> {
    model
        .id()
        .filter(|id| !id.is_zero())
        .ok_or_else(|| DelegateError::MissingId(model.kind()))
}

impl ModelDelegateService {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    async fn apply(&self, method: DelegateMethod, model: Model) -> Result<DelegateOutcome, DelegateError> {
        let outcome = match method {
            DelegateMethod::Add => DelegateOutcome::Model(self.store.add(model).await?),
            DelegateMethod::Save => DelegateOutcome::Model(self.store.save(model).await?),
            DelegateMethod::Delete => {
                self.store.delete(model.kind(), identity(&model)?).await?;
                DelegateOutcome::Model(model)
            }
            DelegateMethod::Refresh => {
                let id = identity(&model)?;
                DelegateOutcome::Model(self.store.get_by_id(model.kind(), id).await?)
            }
            DelegateMethod::GetDerived => {
                let id = identity(&model)?;
                let current = self.store.get_by_id(model.kind(), id).await?;
                DelegateOutcome::Artifact(self.store.get_artifact(current.kind(), id).await?)
            }
        };
        Ok(outcome)
    }
}

#[async_trait]
impl ModelDelegateApi for ModelDelegateService {
    async fn execute(&self, msg: &DelegateMessage) -> Result<DelegateOutcome, DelegateError> {
        let _timer = time_histogram!(DELEGATE_DURATION);

        let kind = msg
            .model_kind()
            .map_err(|id| DelegateError::InvalidModelType(format!("unknown model id {id}")))?;
        let model = Model::decode(kind, &msg.data)
            .map_err(|e| DelegateError::InvalidModelType(format!("{kind}: {e}")))?;
        let method = msg.method().map_err(DelegateError::InvalidMethod);

        let (method_label, result) = match method {
            Ok(method) => (method.as_str(), self.apply(method, model).await),
            Err(e) => ("unknown", Err(e)),
        };

        match &result {
            Ok(_) => {
                metric_inc!(DELEGATE_CALLS, &[kind.as_str(), method_label, "ok"]);
                debug!(model = %kind, method = method_label, "[tc-03] delegate applied");
            }
            Err(e) => {
                metric_inc!(DELEGATE_CALLS, &[kind.as_str(), method_label, "error"]);
                record_error!("tc-03", shared_types::ErrorCoded::error_code(e).as_str());
                warn!(model = %kind, method = method_label, error = %e, "[tc-03] delegate failed");
            }
        }
        result
    }
}

/// Model kind named by a message, for logging before decoding.
#[must_use]
pub fn describe(msg: &DelegateMessage) -> String {
    match ModelKind::try_from(msg.model_id) {
        Ok(kind) => kind.to_string(),
        Err(id) => format!("model#{id}"),
    }
}
