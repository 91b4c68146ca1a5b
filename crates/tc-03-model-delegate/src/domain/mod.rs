pub mod errors;
pub mod outcome;

pub use errors::DelegateError;
pub use outcome::DelegateOutcome;
