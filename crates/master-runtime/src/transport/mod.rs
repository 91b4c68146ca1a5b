//! Network transport for the master.

pub mod router;

pub use router::{build_router, TransportError};
