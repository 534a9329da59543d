//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionStore` - subscriptions and the payment event log

mod subscription_store;

pub use subscription_store::PostgresSubscriptionStore;
