pub mod service;

pub use service::MessageRoutingService;
