//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary
//! shared by the billing domain, ports, and adapters.

mod email;
mod errors;
mod timestamp;

pub use email::Email;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use timestamp::Timestamp;
