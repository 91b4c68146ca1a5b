//! Outbound Ports (Driven Ports)

use crate::domain::DelegateError;
use async_trait::async_trait;
use shared_types::{Request, Response};

/// How a non-authoritative node reaches the master's `Do` endpoint.
#[async_trait]
pub trait DelegateTransport: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, DelegateError>;
}
