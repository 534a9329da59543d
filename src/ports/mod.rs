//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionStore` - subscription rows and the payment event log
//! - `PendingCheckoutCache` - checkout intents awaiting provider confirmation

mod pending_checkout_cache;
mod subscription_store;

pub use pending_checkout_cache::PendingCheckoutCache;
pub use subscription_store::{InsertOutcome, SubscriptionStore};
