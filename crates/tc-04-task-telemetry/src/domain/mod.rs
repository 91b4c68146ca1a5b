pub mod errors;
pub mod normalize;

pub use errors::IngestError;
pub use normalize::normalize_record;
