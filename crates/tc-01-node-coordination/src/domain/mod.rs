//! Domain module for Node Coordination
//!
//! Node entities and the lifecycle state machine live in `shared-types`;
//! this crate owns the errors.

pub mod errors;

pub use errors::CoordinationError;
