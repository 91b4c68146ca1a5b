//! Application services for Model Delegate.

pub mod service;

pub use service::ModelDelegateService;
