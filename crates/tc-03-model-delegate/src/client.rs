//! Delegate client used by non-authoritative nodes.
//!
//! Each call serializes one entity, ships it to the master over a
//! [`DelegateTransport`] and decodes the authoritative result. The local
//! copy is never touched; callers replace it with what comes back.

use crate::domain::DelegateError;
use crate::ipc::ModelDelegateHandler;
use crate::ports::outbound::DelegateTransport;
use async_trait::async_trait;
use shared_types::{codec, Artifact, DelegateMessage, DelegateMethod, Model, ModelKind, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// In-process transport that hands requests straight to a handler.
///
/// Used by the master when it acts on its own store through the same
/// code path as remote workers, and in tests.
pub struct LocalTransport {
    handler: Arc<ModelDelegateHandler>,
}

impl LocalTransport {
    pub fn new(handler: Arc<ModelDelegateHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl DelegateTransport for LocalTransport {
    async fn call(&self, request: Request) -> Result<Response, DelegateError> {
        Ok(self.handler.do_request(&request).await)
    }
}

/// Build the unary request for one delegate call.
pub fn delegate_request(
    node_key: &str,
    method: DelegateMethod,
    model: &Model,
) -> Result<Request, DelegateError> {
    let msg = DelegateMessage::new(method, model)?;
    Ok(Request::new(node_key, msg.to_bytes()?))
}

fn check(response: &Response) -> Result<(), DelegateError> {
    if response.is_ok() {
        return Ok(());
    }
    Err(DelegateError::Remote {
        code: response.error_code(),
        message: response.message.clone(),
    })
}

/// Decode a successful entity response as `kind`.
pub fn decode_model(kind: ModelKind, response: &Response) -> Result<Model, DelegateError> {
    check(response)?;
    Model::decode(kind, &response.data).map_err(|e| DelegateError::InvalidModelType(format!("{kind}: {e}")))
}

/// Decode a successful `GetDerived` response.
pub fn decode_artifact(response: &Response) -> Result<Artifact, DelegateError> {
    check(response)?;
    Ok(codec::from_json(&response.data)?)
}

pub struct ModelDelegateClient {
    transport: Arc<dyn DelegateTransport>,
    node_key: String,
}

impl ModelDelegateClient {
    pub fn new(transport: Arc<dyn DelegateTransport>, node_key: impl Into<String>) -> Self {
        Self {
            transport,
            node_key: node_key.into(),
        }
    }

    #[must_use]
    pub fn node_key(&self) -> &str {
        &self.node_key
    }

    async fn call(&self, method: DelegateMethod, model: &Model) -> Result<Response, DelegateError> {
        debug!(node_key = %self.node_key, model = %model.kind(), method = method.as_str(), "[tc-03] delegating");
        let request = delegate_request(&self.node_key, method, model)?;
        self.transport.call(request).await
    }

    async fn call_model(&self, method: DelegateMethod, model: &Model) -> Result<Model, DelegateError> {
        let response = self.call(method, model).await?;
        decode_model(model.kind(), &response)
    }

    /// Create `model` on the master. The result carries the assigned id.
    pub async fn add(&self, model: &Model) -> Result<Model, DelegateError> {
        self.call_model(DelegateMethod::Add, model).await
    }

    pub async fn save(&self, model: &Model) -> Result<Model, DelegateError> {
        self.call_model(DelegateMethod::Save, model).await
    }

    pub async fn delete(&self, model: &Model) -> Result<Model, DelegateError> {
        self.call_model(DelegateMethod::Delete, model).await
    }

    /// Stored state for `model`'s identity.
    pub async fn refresh(&self, model: &Model) -> Result<Model, DelegateError> {
        self.call_model(DelegateMethod::Refresh, model).await
    }

    pub async fn get_artifact(&self, model: &Model) -> Result<Artifact, DelegateError> {
        let response = self.call(DelegateMethod::GetDerived, model).await?;
        decode_artifact(&response)
    }
}
