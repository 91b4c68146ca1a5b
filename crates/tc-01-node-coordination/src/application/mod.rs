//! Application services for Node Coordination.

pub mod directory;
pub mod monitor;
pub mod service;

pub use directory::NodeDirectory;
pub use monitor::NodeMonitor;
pub use service::NodeCoordinationService;
