//! # Shared Types Crate
//!
//! Cluster entities, wire envelopes and the stable error codes every
//! subsystem maps its failures onto.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Closed Model Set**: Entity dispatch goes through the [`Model`] sum type;
//!   there is no type-erased entity anywhere on the wire.
//! - **Tolerant Decoding**: Unknown enum tags decode successfully and are
//!   rejected by the receiving service with a coded error.

pub mod codec;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod model;
pub mod object_id;
pub mod records;

pub use entities::*;
pub use envelope::*;
pub use errors::*;
pub use model::{Model, ModelKind};
pub use object_id::{ObjectId, ObjectIdError};
pub use records::{FieldValue, ResultRecord};
