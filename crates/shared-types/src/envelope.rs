//! # Wire Envelopes
//!
//! Every unit exchanged with a node is one of these:
//!
//! | Envelope | Carried by | Encoding |
//! |----------|------------|----------|
//! | `Request` / `Response` | unary RPCs | bincode |
//! | `StreamMessage` | node, message and task streams | bincode |
//! | `DelegateMessage` | `Request::data` of the delegate RPC | bincode |
//! | `StreamTaskData` | `StreamMessage::data` of the task stream | JSON |
//!
//! Enum tags are carried as raw integers and converted with `TryFrom`, so an
//! unknown tag survives decoding and can be answered with `InvalidCode`.

use crate::codec;
use crate::errors::{CodecError, ErrorCoded, ErrorCode};
use crate::model::{Model, ModelKind};
use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};

// =============================================================================
// UNARY
// =============================================================================

/// Unary RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Request {
    /// Key of the calling node. May be empty when the payload names the node.
    pub node_key: String,
    pub data: Vec<u8>,
}

impl Request {
    #[must_use]
    pub fn new(node_key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            node_key: node_key.into(),
            data,
        }
    }

    /// Build a request whose payload is `payload` encoded as JSON.
    pub fn with_json<T: Serialize>(
        node_key: impl Into<String>,
        payload: &T,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(node_key, codec::to_json(payload)?))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseCode {
    #[default]
    Ok,
    Error,
}

/// Unary RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Response {
    pub code: ResponseCode,
    /// Numeric [`ErrorCode`], `0` on success.
    pub error_code: i32,
    pub message: String,
    pub data: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ok_with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Success response carrying `payload` as JSON.
    pub fn ok_with_json<T: Serialize>(payload: &T) -> Result<Self, CodecError> {
        Ok(Self::ok_with_data(codec::to_json(payload)?))
    }

    /// Failure response for any coded error.
    #[must_use]
    pub fn error<E: ErrorCoded + ?Sized>(err: &E) -> Self {
        Self {
            code: ResponseCode::Error,
            error_code: err.error_code().as_i32(),
            message: err.to_string(),
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == ResponseCode::Ok
    }

    /// The failure code, if this is an error response.
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self.code {
            ResponseCode::Ok => None,
            ResponseCode::Error => ErrorCode::from_i32(self.error_code),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

// =============================================================================
// STREAMING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StreamMessageCode {
    Connect = 1,
    Disconnect = 2,
    Send = 3,
    InsertData = 4,
    InsertLogs = 5,
}

impl TryFrom<i32> for StreamMessageCode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Connect),
            2 => Ok(Self::Disconnect),
            3 => Ok(Self::Send),
            4 => Ok(Self::InsertData),
            5 => Ok(Self::InsertLogs),
            other => Err(other),
        }
    }
}

/// One envelope on a streaming RPC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamMessage {
    pub code: i32,
    /// Key of the node owning the stream.
    pub node_key: String,
    /// Explicit routing key; overrides `node_key` on `Connect`.
    pub key: String,
    pub from: String,
    /// Destination routing key (`Send` only).
    pub to: String,
    pub data: Vec<u8>,
}

impl StreamMessage {
    fn with_code(code: StreamMessageCode) -> Self {
        Self {
            code: code as i32,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn connect(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::with_code(StreamMessageCode::Connect)
        }
    }

    #[must_use]
    pub fn disconnect(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::with_code(StreamMessageCode::Disconnect)
        }
    }

    #[must_use]
    pub fn send(from: impl Into<String>, to: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            data,
            ..Self::with_code(StreamMessageCode::Send)
        }
    }

    pub fn insert_data(node_key: impl Into<String>, payload: &StreamTaskData) -> Result<Self, CodecError> {
        Ok(Self {
            node_key: node_key.into(),
            data: payload.to_json()?,
            ..Self::with_code(StreamMessageCode::InsertData)
        })
    }

    pub fn insert_logs(node_key: impl Into<String>, payload: &StreamTaskData) -> Result<Self, CodecError> {
        Ok(Self {
            node_key: node_key.into(),
            data: payload.to_json()?,
            ..Self::with_code(StreamMessageCode::InsertLogs)
        })
    }

    /// Decoded envelope code, or the raw value if unknown.
    pub fn code(&self) -> Result<StreamMessageCode, i32> {
        StreamMessageCode::try_from(self.code)
    }

    /// Routing key the sender names itself by: the explicit key, else the
    /// stream owner's node key.
    #[must_use]
    pub fn source_key(&self) -> &str {
        if self.key.is_empty() {
            &self.node_key
        } else {
            &self.key
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

// =============================================================================
// DELEGATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DelegateMethod {
    Add = 1,
    Save = 2,
    Delete = 3,
    Refresh = 4,
    GetDerived = 5,
}

impl DelegateMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Refresh => "refresh",
            Self::GetDerived => "get_derived",
        }
    }
}

impl TryFrom<i32> for DelegateMethod {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Add),
            2 => Ok(Self::Save),
            3 => Ok(Self::Delete),
            4 => Ok(Self::Refresh),
            5 => Ok(Self::GetDerived),
            other => Err(other),
        }
    }
}

/// Remote mutation request against one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DelegateMessage {
    pub model_id: i32,
    pub method: i32,
    /// JSON-encoded entity state.
    pub data: Vec<u8>,
}

impl DelegateMessage {
    pub fn new(method: DelegateMethod, model: &Model) -> Result<Self, CodecError> {
        Ok(Self {
            model_id: model.kind().as_i32(),
            method: method as i32,
            data: model.encode()?,
        })
    }

    pub fn model_kind(&self) -> Result<ModelKind, i32> {
        ModelKind::try_from(self.model_id)
    }

    pub fn method(&self) -> Result<DelegateMethod, i32> {
        DelegateMethod::try_from(self.method)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

// =============================================================================
// TASK TELEMETRY
// =============================================================================

/// Batch of result rows and log lines for one task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTaskData {
    pub task_id: ObjectId,
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
    pub logs: Vec<String>,
}

impl StreamTaskData {
    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        codec::to_json(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::from_json(bytes)
    }
}
