//! # Master Runtime Library
//!
//! The master's composition root, exposed as a library for the integration
//! tests. The binary in `main.rs` only loads configuration and telemetry.
//!
//! - `container/` - configuration and subsystem wiring
//! - `adapters/` - stats persistence and the WebSocket stream bridge
//! - `transport/` - axum router for every RPC

pub mod adapters;
pub mod container;
pub mod runtime;
pub mod transport;

pub use container::{ConfigError, RuntimeConfig, SubsystemContainer};
pub use runtime::MasterRuntime;
pub use transport::build_router;
