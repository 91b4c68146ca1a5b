//! # Master Runtime
//!
//! Owns the subsystem container and the background tasks around it.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Upsert the master's own node record
//! 3. Start the liveness monitor
//! 4. Serve the router until shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use shared_types::Node;

use crate::container::{RuntimeConfig, SubsystemContainer};
use crate::transport::build_router;

pub struct MasterRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl MasterRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate().context("invalid runtime configuration")?;
        Ok(Self::with_container(Arc::new(SubsystemContainer::new(config))))
    }

    pub fn with_container(container: Arc<SubsystemContainer>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            shutdown_tx,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// Write the master's own node record. Registration refuses masters.
    pub async fn bootstrap_master(&self) -> Result<Node> {
        let key = self.container.config.master_key.clone();
        let master = Node {
            key: key.clone(),
            hostname: hostname(),
            ..Default::default()
        };
        let node = self
            .container
            .directory
            .upsert_master(master)
            .await
            .with_context(|| format!("failed to upsert master node {key}"))?;
        info!(node_key = %node.key, "[tc-01] master node online");
        Ok(node)
    }

    /// Spawn the heartbeat timeout monitor.
    pub fn start_monitor(&self) -> tokio::task::JoinHandle<()> {
        let monitor = self.container.monitor();
        let shutdown = self.shutdown_rx.clone();
        tokio::spawn(monitor.run(shutdown))
    }

    /// Bootstrap, start background tasks and serve until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.bootstrap_master().await?;
        let monitor = self.start_monitor();

        let addr = listener.local_addr().context("listener has no address")?;
        info!(%addr, "master listening");

        let router = build_router(self.container());
        let mut shutdown = self.shutdown_rx.clone();
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await
            .context("server error");

        if let Err(e) = monitor.await {
            error!(error = %e, "[tc-01] monitor task failed");
        }
        result
    }

    /// Signal every background task and the server to stop.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_default()
}
