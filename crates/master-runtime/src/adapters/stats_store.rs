//! # In-Memory Task Stats
//!
//! Stats persistence used by the master when no external results database
//! is configured. The most recent rows and log lines of the most recent
//! tasks are kept for inspection, bounded by [`StatsRetention`]; older
//! entries are evicted. The task's `TaskStat` counters are bumped in the
//! model store when the record exists and always count the full batch.
//! A bump reads then saves the stat record, so concurrent batches for one
//! task can lose an increment.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_store::ModelStore;
use shared_types::{Model, ModelKind, ObjectId, ResultRecord, TaskStat};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tc_04_task_telemetry::{IngestError, TaskStatsStore};
use tracing::debug;

/// Default number of rows and of log lines kept per task.
pub const DEFAULT_RETAINED_PER_TASK: usize = 1_000;

/// Default number of tasks with retained rows or logs.
pub const DEFAULT_RETAINED_TASKS: usize = 256;

/// Bounds on what the adapter keeps in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRetention {
    /// Rows kept per task, and separately log lines kept per task.
    pub per_task: usize,
    /// Tasks kept; the least recently written task is evicted first.
    pub tasks: usize,
}

impl Default for StatsRetention {
    fn default() -> Self {
        Self {
            per_task: DEFAULT_RETAINED_PER_TASK,
            tasks: DEFAULT_RETAINED_TASKS,
        }
    }
}

#[derive(Default)]
struct TaskBuffer {
    records: VecDeque<ResultRecord>,
    logs: VecDeque<String>,
}

#[derive(Default)]
struct TaskBuffers {
    tasks: HashMap<ObjectId, TaskBuffer>,
    /// Write order, most recent last.
    order: VecDeque<ObjectId>,
}

impl TaskBuffers {
    fn touch(&mut self, task_id: ObjectId, retention: StatsRetention) -> Option<&mut TaskBuffer> {
        if retention.tasks == 0 || retention.per_task == 0 {
            return None;
        }
        if let Some(pos) = self.order.iter().position(|id| *id == task_id) {
            self.order.remove(pos);
        }
        self.order.push_back(task_id);
        while self.order.len() > retention.tasks {
            if let Some(evicted) = self.order.pop_front() {
                self.tasks.remove(&evicted);
                debug!(task_id = %evicted, "[tc-04] evicted retained task output");
            }
        }
        Some(self.tasks.entry(task_id).or_default())
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, items: Vec<T>, limit: usize) {
    buffer.extend(items);
    let excess = buffer.len().saturating_sub(limit);
    buffer.drain(..excess);
}

pub struct InMemoryTaskStats {
    store: Arc<dyn ModelStore>,
    retention: StatsRetention,
    buffers: RwLock<TaskBuffers>,
}

enum Counter {
    Results(u64),
    Logs(u64),
}

impl InMemoryTaskStats {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self::with_retention(store, StatsRetention::default())
    }

    pub fn with_retention(store: Arc<dyn ModelStore>, retention: StatsRetention) -> Self {
        Self {
            store,
            retention,
            buffers: RwLock::new(TaskBuffers::default()),
        }
    }

    /// Retained rows for `task_id`, oldest first.
    #[must_use]
    pub fn records(&self, task_id: ObjectId) -> Vec<ResultRecord> {
        self.buffers
            .read()
            .tasks
            .get(&task_id)
            .map(|b| b.records.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Retained log lines for `task_id`, oldest first.
    #[must_use]
    pub fn logs(&self, task_id: ObjectId) -> Vec<String> {
        self.buffers
            .read()
            .tasks
            .get(&task_id)
            .map(|b| b.logs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of tasks with retained output.
    #[must_use]
    pub fn retained_tasks(&self) -> usize {
        self.buffers.read().tasks.len()
    }

    async fn bump(&self, task_id: ObjectId, counter: Counter) -> Result<(), IngestError> {
        let model = match self.store.get_by_id(ModelKind::TaskStat, task_id).await {
            Ok(model) => model,
            Err(e) if e.is_not_found() => {
                debug!(task_id = %task_id, "no task stat record, counters skipped");
                return Ok(());
            }
            Err(e) => return Err(IngestError::Stats(e.to_string())),
        };
        let Ok(mut stat) = TaskStat::try_from(model) else {
            return Err(IngestError::Stats(format!("task stat {task_id} has the wrong kind")));
        };
        match counter {
            Counter::Results(n) => stat.result_count += n,
            Counter::Logs(n) => stat.log_count += n,
        }
        self.store
            .save(Model::from(stat))
            .await
            .map(|_| ())
            .map_err(|e| IngestError::Stats(e.to_string()))
    }
}

#[async_trait]
impl TaskStatsStore for InMemoryTaskStats {
    async fn insert_data(&self, task_id: ObjectId, records: Vec<ResultRecord>) -> Result<(), IngestError> {
        let count = records.len() as u64;
        {
            let mut buffers = self.buffers.write();
            if let Some(buffer) = buffers.touch(task_id, self.retention) {
                push_bounded(&mut buffer.records, records, self.retention.per_task);
            }
        }
        self.bump(task_id, Counter::Results(count)).await
    }

    async fn insert_logs(&self, task_id: ObjectId, lines: Vec<String>) -> Result<(), IngestError> {
        let count = lines.len() as u64;
        {
            let mut buffers = self.buffers.write();
            if let Some(buffer) = buffers.touch(task_id, self.retention) {
                push_bounded(&mut buffer.logs, lines, self.retention.per_task);
            }
        }
        self.bump(task_id, Counter::Logs(count)).await
    }
}
