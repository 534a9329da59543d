//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, timestamps, email)
//! - `billing` - Subscription vocabulary, provider events, signature
//!   verification, and the event-to-write transition table

pub mod billing;
pub mod foundation;
