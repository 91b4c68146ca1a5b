//! # Task-Cluster Master
//!
//! Entry point for the master node.
//!
//! 1. Initialize logging and metrics
//! 2. Load and validate `TC_*` configuration
//! 3. Serve until Ctrl+C

use anyhow::{Context, Result};
use cluster_telemetry::{init_telemetry, TelemetryConfig};
use master_runtime::{MasterRuntime, RuntimeConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env()?;
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("===========================================");
    info!("  Task-Cluster Master v{}", env!("CARGO_PKG_VERSION"));
    info!("  Service: {}", telemetry.service_name);
    info!("===========================================");

    let runtime = Arc::new(MasterRuntime::new(config)?);
    let server = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move { runtime.serve(listener).await })
    };

    info!("Master is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    runtime.shutdown();

    server.await.context("server task panicked")??;
    info!("Shutdown complete");
    Ok(())
}
