//! # Shared Store Crate
//!
//! Driven port for the authoritative document store ([`ModelStore`]) plus an
//! in-memory adapter. Subsystems only ever see the trait object.

pub mod error;
pub mod memory;
pub mod query;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryModelStore;
pub use query::{ListOptions, Query};
pub use store::ModelStore;
