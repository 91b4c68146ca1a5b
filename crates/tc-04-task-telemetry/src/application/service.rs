//! # Task Telemetry Service
//!
//! Best-effort ingestion: one bad envelope never costs the worker its
//! stream. Decode failures, empty task ids, unknown codes and stats store
//! errors are logged, counted and skipped.

use crate::config::IngestConfig;
use crate::domain::{normalize_record, IngestError};
use crate::ports::inbound::TaskTelemetryApi;
use crate::ports::outbound::TaskStatsStore;
use async_trait::async_trait;
use cluster_telemetry::{metric_add, metric_inc, record_error, TELEMETRY_LOGS, TELEMETRY_RECORDS, TELEMETRY_REJECTED};
use shared_bus::StreamSource;
use shared_types::{ResultRecord, StreamMessage, StreamMessageCode, StreamTaskData};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct TaskTelemetryService {
    stats: Arc<dyn TaskStatsStore>,
    config: IngestConfig,
}

fn decode(msg: &StreamMessage) -> Result<StreamTaskData, IngestError> {
    let data = StreamTaskData::from_json(&msg.data)?;
    if data.task_id.is_zero() {
        return Err(IngestError::EmptyTaskId);
    }
    Ok(data)
}

impl TaskTelemetryService {
    pub fn new(stats: Arc<dyn TaskStatsStore>, config: IngestConfig) -> Self {
        Self { stats, config }
    }

    async fn insert_data(&self, msg: &StreamMessage) -> Result<(), IngestError> {
        let data = decode(msg)?;
        let mut promoted = 0usize;
        let records: Vec<ResultRecord> = data
            .records
            .into_iter()
            .map(|row| {
                let mut record = ResultRecord::from_json(row);
                if normalize_record(&mut record, &self.config.record_id_field) {
                    promoted += 1;
                }
                record
            })
            .collect();

        let count = records.len() as u64;
        debug!(task_id = %data.task_id, records = count, promoted, "[tc-04] insert data");
        self.stats.insert_data(data.task_id, records).await?;
        metric_add!(TELEMETRY_RECORDS, count);
        Ok(())
    }

    async fn insert_logs(&self, msg: &StreamMessage) -> Result<(), IngestError> {
        let data = decode(msg)?;
        let count = data.logs.len() as u64;
        debug!(task_id = %data.task_id, lines = count, "[tc-04] insert logs");
        self.stats.insert_logs(data.task_id, data.logs).await?;
        metric_add!(TELEMETRY_LOGS, count);
        Ok(())
    }
}

#[async_trait]
impl TaskTelemetryApi for TaskTelemetryService {
    async fn subscribe(&self, source: &mut dyn StreamSource) -> Result<(), IngestError> {
        loop {
            let msg = match source.recv().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    info!("[tc-04] received EOF, closing stream");
                    return Ok(());
                }
                Err(e) if e.is_cancellation() => {
                    info!(reason = %e, "[tc-04] stream cancelled");
                    return Ok(());
                }
                Err(e) => {
                    record_error!("tc-04", "transport");
                    error!(error = %e, "[tc-04] receive failed");
                    return Err(IngestError::Transport(e));
                }
            };

            if let Err(e) = self.ingest(msg).await {
                metric_inc!(TELEMETRY_REJECTED, &[e.reason()]);
            }
        }
    }

    async fn ingest(&self, msg: StreamMessage) -> Result<(), IngestError> {
        let result = match msg.code() {
            Ok(StreamMessageCode::InsertData) => self.insert_data(&msg).await,
            Ok(StreamMessageCode::InsertLogs) => self.insert_logs(&msg).await,
            Ok(code) => Err(IngestError::InvalidCode(code as i32)),
            Err(code) => Err(IngestError::InvalidCode(code)),
        };

        if let Err(e) = &result {
            match e {
                IngestError::InvalidCode(code) => {
                    error!(code, node_key = %msg.node_key, "[tc-04] invalid stream message code");
                }
                IngestError::Stats(_) => {
                    record_error!("tc-04", "stats");
                    error!(code = msg.code, node_key = %msg.node_key, error = %e, "[tc-04] stats store rejected batch");
                }
                _ => {
                    warn!(code = msg.code, node_key = %msg.node_key, error = %e, "[tc-04] message rejected");
                }
            }
        }
        result
    }
}
