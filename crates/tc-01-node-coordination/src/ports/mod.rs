//! Ports module for Node Coordination
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::NodeCoordinationApi;
pub use outbound::{ManualTimeSource, SystemTimeSource, TimeSource};
