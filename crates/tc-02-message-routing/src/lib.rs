//! # TC-02: Message Routing Subsystem
//!
//! Generic connect/disconnect/send protocol between named endpoints. Any
//! participant (not only nodes) can connect a duplex stream, claim a routing
//! key, and receive envelopes other participants send to that key.
//!
//! ```text
//! peer A ──Send(to=B)──► [MessageRoutingService] ──registry.get(B)──► peer B
//! ```
//!
//! Within one stream envelopes are handled strictly in receipt order. There
//! is no ordering between streams.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::MessageRoutingService;
pub use config::RoutingConfig;
pub use domain::errors::RoutingError;
pub use ports::inbound::MessageRoutingApi;
