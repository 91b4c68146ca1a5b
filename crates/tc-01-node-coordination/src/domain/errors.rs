//! Error types for Node Coordination

use shared_bus::RegistryError;
use shared_store::StoreError;
use shared_types::{CodecError, ErrorCode, ErrorCoded, NodeStatus};
use thiserror::Error;

/// All errors that can occur in node coordination
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// Neither the request nor the payload named a node
    #[error("Node key is missing from both request and payload")]
    MissingIdentity,

    /// Master identities are never registered through the protocol
    #[error("Node {0} is a master and cannot be registered")]
    NotAllowed(String),

    #[error("Node {0} does not exist")]
    NodeNotFound(String),

    #[error("Node {0} is not registered")]
    NodeUnregistered(String),

    #[error("No subscription for node {0}")]
    SubscribeNotFound(String),

    #[error("Invalid status transition for node {key}: {from:?} -> {to:?}")]
    InvalidTransition {
        key: String,
        from: NodeStatus,
        to: NodeStatus,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] CodecError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CoordinationError {
    /// Short label for the error metric.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.error_code().as_str()
    }
}

impl ErrorCoded for CoordinationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingIdentity => ErrorCode::MissingIdentity,
            Self::NotAllowed(_) => ErrorCode::NotAllowed,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::NodeUnregistered(_) => ErrorCode::NodeUnregistered,
            Self::SubscribeNotFound(_) => ErrorCode::SubscribeNotFound,
            Self::InvalidPayload(_) => ErrorCode::InvalidModelType,
            Self::InvalidTransition { .. } | Self::Store(_) => ErrorCode::InternalError,
        }
    }
}

impl From<RegistryError> for CoordinationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(key) => Self::SubscribeNotFound(key),
        }
    }
}
