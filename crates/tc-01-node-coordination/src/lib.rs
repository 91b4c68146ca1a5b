//! # TC-01: Node Coordination Subsystem
//!
//! Tracks cluster membership: registration, heartbeats, liveness and the
//! long-lived control stream each worker keeps open to the master.
//!
//! ## Operations
//!
//! | Operation | Outcome | Errors |
//! |-----------|---------|--------|
//! | `register` | node created or reset to `Registered` | `MissingIdentity`, `NotAllowed` |
//! | `heartbeat` | node `Online`, timestamp refreshed | `NodeNotFound`, `NodeUnregistered` |
//! | `ping` | nothing | none |
//! | `subscribe` | blocks until unsubscribed or disconnected | none |
//! | `unsubscribe` | finished signal + registry entry removed | `SubscribeNotFound` |
//!
//! Master nodes are never created or mutated through `register`; the runtime
//! bootstraps its own record with [`NodeDirectory::upsert_master`].
//!
//! ## Module Structure
//!
//! ```text
//! ports/inbound.rs          - NodeCoordinationApi
//! ports/outbound.rs         - TimeSource
//! application/directory.rs  - NodeDirectory (store-backed lifecycle mutator)
//! application/service.rs    - NodeCoordinationService
//! application/monitor.rs    - NodeMonitor (heartbeat timeout sweeps)
//! ipc/handler.rs            - Request/Response adapter
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use application::{NodeCoordinationService, NodeDirectory, NodeMonitor};
pub use config::MonitorConfig;
pub use domain::errors::CoordinationError;
pub use ipc::NodeCoordinationHandler;
pub use ports::inbound::NodeCoordinationApi;
pub use ports::outbound::{ManualTimeSource, SystemTimeSource, TimeSource};
