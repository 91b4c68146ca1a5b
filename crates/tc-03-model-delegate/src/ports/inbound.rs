//! Inbound Ports (Driving Ports / API)

use crate::domain::{DelegateError, DelegateOutcome};
use async_trait::async_trait;
use shared_types::DelegateMessage;

/// Authoritative side of the delegate protocol.
#[async_trait]
pub trait ModelDelegateApi: Send + Sync {
    /// Decode the entity named by `msg.model_id`, apply `msg.method` to the
    /// store as one atomic operation and return the result.
    async fn execute(&self, msg: &DelegateMessage) -> Result<DelegateOutcome, DelegateError>;
}
