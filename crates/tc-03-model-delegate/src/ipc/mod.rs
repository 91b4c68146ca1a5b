//! IPC Module for Model Delegate

pub mod handler;

pub use handler::ModelDelegateHandler;
