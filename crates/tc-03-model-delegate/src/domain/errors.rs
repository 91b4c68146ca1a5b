//! Error types for Model Delegate

use shared_store::StoreError;
use shared_types::{CodecError, ErrorCode, ErrorCoded, ModelKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelegateError {
    /// Unknown model id, or a payload that does not decode as that model
    #[error("Invalid model type: {0}")]
    InvalidModelType(String),

    #[error("Invalid delegate method: {0}")]
    InvalidMethod(i32),

    /// Identity-addressed method called without an identity
    #[error("{0} payload carries no id")]
    MissingId(ModelKind),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Error response received by the client side
    #[error("Remote error ({code:?}): {message}")]
    Remote { code: Option<ErrorCode>, message: String },
}

impl ErrorCoded for DelegateError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidModelType(_) => ErrorCode::InvalidModelType,
            Self::InvalidMethod(_) => ErrorCode::InvalidCode,
            Self::MissingId(_) => ErrorCode::NotFound,
            Self::Store(e) => e.error_code(),
            Self::Codec(_) => ErrorCode::InternalError,
            Self::Remote { code, .. } => code.unwrap_or(ErrorCode::InternalError),
        }
    }
}
