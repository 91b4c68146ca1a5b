pub mod inbound;

pub use inbound::MessageRoutingApi;
