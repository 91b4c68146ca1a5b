//! # Codec
//!
//! Two encodings are in play:
//!
//! - **Wire envelopes** (`Request`, `Response`, `StreamMessage`,
//!   `DelegateMessage`) use bincode: compact and deterministic.
//! - **Payloads** (entities, `NodeInfo`, `StreamTaskData`) use JSON because
//!   result rows are schemaless.

use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a wire envelope.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a wire envelope.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode a payload as JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a JSON payload.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}
