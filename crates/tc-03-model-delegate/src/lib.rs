//! # TC-03: Model Delegate Subsystem
//!
//! Lets worker nodes mutate entities they do not own. Every mutation is
//! shipped to the master as a `(model kind, method, JSON entity)` triple,
//! applied to the authoritative store, and the stored state is returned.
//!
//! | Method | Store effect | Response payload |
//! |--------|--------------|------------------|
//! | `Add` | insert, id assigned | entity |
//! | `Save` | replace by id | entity |
//! | `Delete` | remove by id | entity as sent |
//! | `Refresh` | none | stored entity |
//! | `GetDerived` | none | artifact of the entity |
//!
//! Unknown model ids and undecodable payloads fail with `InvalidModelType`;
//! unknown methods fail with `InvalidCode`. Store errors keep their code.

pub mod application;
pub mod client;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use application::ModelDelegateService;
pub use client::{delegate_request, decode_artifact, decode_model, LocalTransport, ModelDelegateClient};
pub use domain::{DelegateError, DelegateOutcome};
pub use ipc::ModelDelegateHandler;
pub use ports::{DelegateTransport, ModelDelegateApi};
