//! Error types for Task Telemetry ingestion

use shared_bus::StreamError;
use shared_types::{CodecError, ErrorCode, ErrorCoded};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Payload is not a valid task data batch
    #[error("Malformed task data: {0}")]
    Decode(#[from] CodecError),

    #[error("Task data carries no task id")]
    EmptyTaskId,

    #[error("Invalid stream message code: {0}")]
    InvalidCode(i32),

    /// Stats collaborator refused the batch
    #[error("Stats store error: {0}")]
    Stats(String),

    #[error("Stream receive failed: {0}")]
    Transport(StreamError),
}

impl IngestError {
    /// Metric label for a rejected message.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::EmptyTaskId => "empty_task_id",
            Self::InvalidCode(_) => "invalid_code",
            Self::Stats(_) => "stats",
            Self::Transport(_) => "transport",
        }
    }
}

impl ErrorCoded for IngestError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidCode(_) => ErrorCode::InvalidCode,
            Self::Decode(_) | Self::EmptyTaskId | Self::Stats(_) | Self::Transport(_) => {
                ErrorCode::InternalError
            }
        }
    }
}
