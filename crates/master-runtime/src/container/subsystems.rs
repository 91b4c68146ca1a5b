//! # Subsystem Container
//!
//! Holds every subsystem instance the master serves, wired in dependency
//! order:
//!
//! ```text
//! Phase 1: model store, subscription registry, clock
//! Phase 2: node directory → coordination service, monitor
//! Phase 3: message routing (registry only)
//! Phase 4: model delegate (store only)
//! Phase 5: stats adapter → task telemetry
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use shared_bus::SubscriptionRegistry;
use shared_store::{InMemoryModelStore, ModelStore};
use tc_01_node_coordination::{
    NodeCoordinationHandler, NodeCoordinationService, NodeDirectory, NodeMonitor, SystemTimeSource,
    TimeSource,
};
use tc_02_message_routing::MessageRoutingService;
use tc_03_model_delegate::{ModelDelegateHandler, ModelDelegateService};
use tc_04_task_telemetry::TaskTelemetryService;

use crate::adapters::InMemoryTaskStats;
use crate::container::config::RuntimeConfig;

pub struct SubsystemContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Authoritative model store.
    pub store: Arc<dyn ModelStore>,

    /// Routing key → live stream. Shared by coordination and routing.
    pub registry: Arc<SubscriptionRegistry>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Node directory (TC-01), also used for the master bootstrap.
    pub directory: Arc<NodeDirectory>,

    /// Node Coordination (TC-01)
    pub coordination: Arc<NodeCoordinationService>,
    pub coordination_handler: Arc<NodeCoordinationHandler>,

    /// Message Routing (TC-02)
    pub routing: Arc<MessageRoutingService>,

    /// Model Delegate (TC-03)
    pub delegate_handler: Arc<ModelDelegateHandler>,

    /// Task Telemetry (TC-04)
    pub telemetry: Arc<TaskTelemetryService>,
    pub task_stats: Arc<InMemoryTaskStats>,

    /// Runtime configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl SubsystemContainer {
    /// Build every subsystem over a fresh in-memory store.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryModelStore::new()), Arc::new(SystemTimeSource))
    }

    #[instrument(name = "subsystem_init", skip_all)]
    pub fn with_store(config: RuntimeConfig, store: Arc<dyn ModelStore>, clock: Arc<dyn TimeSource>) -> Self {
        info!("Phase 1: shared infrastructure");
        let registry = Arc::new(SubscriptionRegistry::new());

        info!("Phase 2: [tc-01] node coordination");
        let directory = Arc::new(NodeDirectory::new(Arc::clone(&store), clock));
        let coordination = Arc::new(NodeCoordinationService::new(
            Arc::clone(&directory),
            Arc::clone(&registry),
        ));
        let coordination_handler = Arc::new(NodeCoordinationHandler::new(coordination.clone()));

        info!("Phase 3: [tc-02] message routing");
        let routing = Arc::new(MessageRoutingService::new(Arc::clone(&registry)));

        info!("Phase 4: [tc-03] model delegate");
        let delegate = Arc::new(ModelDelegateService::new(Arc::clone(&store)));
        let delegate_handler = Arc::new(ModelDelegateHandler::new(delegate));

        info!("Phase 5: [tc-04] task telemetry");
        let task_stats = Arc::new(InMemoryTaskStats::with_retention(
            Arc::clone(&store),
            config.stats_retention,
        ));
        let telemetry = Arc::new(TaskTelemetryService::new(
            task_stats.clone(),
            config.ingest.clone(),
        ));

        Self {
            store,
            registry,
            directory,
            coordination,
            coordination_handler,
            routing,
            delegate_handler,
            telemetry,
            task_stats,
            config,
        }
    }

    /// Liveness monitor over this container's directory.
    #[must_use]
    pub fn monitor(&self) -> NodeMonitor {
        NodeMonitor::new(Arc::clone(&self.directory), self.config.monitor.clone())
    }
}
