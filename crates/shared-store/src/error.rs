//! Store error types.

use shared_types::{CodecError, ErrorCode, ErrorCoded, ModelKind, ObjectId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: ModelKind, id: ObjectId },

    #[error("No {kind} matches the query")]
    NoMatch { kind: ModelKind },

    #[error("{kind} has no identity")]
    MissingId { kind: ModelKind },

    #[error("{kind} with id {id} already exists")]
    Duplicate { kind: ModelKind, id: ObjectId },

    #[error("{kind} with key {key:?} already exists")]
    DuplicateKey { kind: ModelKind, key: String },

    #[error("Store codec failure: {0}")]
    Codec(#[from] CodecError),

    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the failure means "no such record" rather than a fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoMatch { .. })
    }
}

impl ErrorCoded for StoreError {
    fn error_code(&self) -> ErrorCode {
        if self.is_not_found() {
            ErrorCode::NotFound
        } else {
            ErrorCode::InternalError
        }
    }
}
