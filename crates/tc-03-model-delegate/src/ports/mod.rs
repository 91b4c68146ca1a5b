pub mod inbound;
pub mod outbound;

pub use inbound::ModelDelegateApi;
pub use outbound::DelegateTransport;
