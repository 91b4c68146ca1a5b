//! Error types for Message Routing

use shared_bus::{RegistryError, StreamError};
use shared_types::{ErrorCode, ErrorCoded};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// Destination has no live subscription
    #[error("No subscription for destination {0}")]
    SubscribeNotFound(String),

    /// Destination stream rejected the write
    #[error("Write to {to} failed: {source}")]
    WriteFailed { to: String, source: StreamError },

    /// Receiving from the connected stream failed
    #[error("Stream receive failed: {0}")]
    Transport(StreamError),
}

impl ErrorCoded for RoutingError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::SubscribeNotFound(_) => ErrorCode::SubscribeNotFound,
            Self::WriteFailed { .. } | Self::Transport(_) => ErrorCode::InternalError,
        }
    }
}

impl From<RegistryError> for RoutingError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(key) => Self::SubscribeNotFound(key),
        }
    }
}
