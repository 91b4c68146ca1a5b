//! # Error Types
//!
//! Stable error codes carried in unary responses, plus the codec error shared
//! by every crate that touches the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, wire-visible error code.
///
/// The numeric values are part of the protocol and MUST NOT be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Neither the envelope nor the payload named a node key.
    MissingIdentity = 1,
    /// Master identities cannot be registered or mutated through the protocol.
    NotAllowed = 2,
    /// No node exists for the key.
    NodeNotFound = 3,
    /// The node exists but was never registered.
    NodeUnregistered = 4,
    /// No live subscription for the routing key.
    SubscribeNotFound = 5,
    /// Unknown model identifier or undecodable entity payload.
    InvalidModelType = 6,
    /// Unknown envelope code or delegate method.
    InvalidCode = 7,
    /// Encoding or store failure.
    InternalError = 8,
    /// The store has no record for the requested identity.
    NotFound = 9,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::MissingIdentity),
            2 => Some(Self::NotAllowed),
            3 => Some(Self::NodeNotFound),
            4 => Some(Self::NodeUnregistered),
            5 => Some(Self::SubscribeNotFound),
            6 => Some(Self::InvalidModelType),
            7 => Some(Self::InvalidCode),
            8 => Some(Self::InternalError),
            9 => Some(Self::NotFound),
            _ => None,
        }
    }

    /// Short label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingIdentity => "missing_identity",
            Self::NotAllowed => "not_allowed",
            Self::NodeNotFound => "node_not_found",
            Self::NodeUnregistered => "node_unregistered",
            Self::SubscribeNotFound => "subscribe_not_found",
            Self::InvalidModelType => "invalid_model_type",
            Self::InvalidCode => "invalid_code",
            Self::InternalError => "internal_error",
            Self::NotFound => "not_found",
        }
    }
}

/// Implemented by every error that can cross a unary RPC boundary.
pub trait ErrorCoded: std::error::Error {
    fn error_code(&self) -> ErrorCode;
}

/// Wire and payload encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Decode failed: {0}")]
    Decode(String),
}

impl ErrorCoded for CodecError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InternalError
    }
}
