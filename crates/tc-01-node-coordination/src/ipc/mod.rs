//! IPC Module for Node Coordination
//!
//! Unary request/response adapters. The control stream (`subscribe`) is
//! wired by the transport straight onto the service.

pub mod handler;

pub use handler::NodeCoordinationHandler;
