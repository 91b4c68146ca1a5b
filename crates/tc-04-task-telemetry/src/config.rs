//! Configuration for Task Telemetry ingestion

use serde::{Deserialize, Serialize};

/// Field of a result row that holds the owning task's id.
pub const DEFAULT_RECORD_ID_FIELD: &str = "_tid";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Row field promoted to a native id when it holds a hex string
    pub record_id_field: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            record_id_field: DEFAULT_RECORD_ID_FIELD.to_string(),
        }
    }
}
