//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum router for provider webhooks
//! - `memory` - in-process store and checkout cache
//! - `postgres` - sqlx-backed subscription store
//! - `postgrest` - hosted REST data API subscription store

pub mod http;
pub mod memory;
pub mod postgres;
pub mod postgrest;

pub use memory::{InMemoryPendingCheckoutCache, InMemorySubscriptionStore};
pub use postgres::PostgresSubscriptionStore;
pub use postgrest::{RestStoreConfig, RestSubscriptionStore};
