//! # Node Monitor
//!
//! Periodically marks online workers offline once their last heartbeat is
//! older than the configured timeout. Masters are never touched.

use crate::application::directory::NodeDirectory;
use crate::config::MonitorConfig;
use crate::domain::errors::CoordinationError;
use cluster_telemetry::{metric_inc, record_error, NODES_MARKED_OFFLINE};
use shared_store::Query;
use shared_types::NodeStatus;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct NodeMonitor {
    directory: Arc<NodeDirectory>,
    config: MonitorConfig,
}

impl NodeMonitor {
    pub fn new(directory: Arc<NodeDirectory>, config: MonitorConfig) -> Self {
        Self { directory, config }
    }

    /// One scan. Returns the keys of the nodes marked offline.
    pub async fn sweep(&self) -> Result<Vec<String>, CoordinationError> {
        let now = self.directory.clock().now();
        let timeout = chrono::Duration::from_std(self.config.heartbeat_timeout())
            .unwrap_or(chrono::Duration::MAX);

        let online = self
            .directory
            .list(&Query::new().eq("status", NodeStatus::Online.as_str()))
            .await?;

        let mut marked = Vec::new();
        for node in online {
            if node.is_master {
                continue;
            }
            let stale = match node.active_ts {
                Some(ts) => now.signed_duration_since(ts) > timeout,
                None => true,
            };
            if !stale {
                continue;
            }

            let key = node.key.clone();
            match self.directory.set_offline(node).await {
                Ok(_) => {
                    metric_inc!(NODES_MARKED_OFFLINE);
                    warn!(node_key = %key, "[tc-01] heartbeat timeout, node offline");
                    marked.push(key);
                }
                Err(e) => {
                    record_error!("tc-01", e.label());
                    error!(node_key = %key, error = %e, "[tc-01] failed to mark node offline");
                }
            }
        }
        Ok(marked)
    }

    /// Sweep every interval until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.monitor_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(
            interval_secs = self.config.monitor_interval_secs,
            timeout_secs = self.config.heartbeat_timeout_secs,
            "[tc-01] node monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        record_error!("tc-01", e.label());
                        error!(error = %e, "[tc-01] monitor sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("[tc-01] node monitor stopped");
    }
}
