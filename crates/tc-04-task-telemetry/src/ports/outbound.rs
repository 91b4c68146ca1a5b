//! Outbound Ports (Driven Ports)

use crate::domain::IngestError;
use async_trait::async_trait;
use shared_types::{ObjectId, ResultRecord};

/// Stats persistence collaborator.
#[async_trait]
pub trait TaskStatsStore: Send + Sync {
    async fn insert_data(&self, task_id: ObjectId, records: Vec<ResultRecord>) -> Result<(), IngestError>;

    async fn insert_logs(&self, task_id: ObjectId, lines: Vec<String>) -> Result<(), IngestError>;
}
