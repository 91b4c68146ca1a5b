pub mod errors;

pub use errors::RoutingError;
