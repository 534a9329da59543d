//! In-memory adapters for tests and single-process development.

mod pending_checkout_cache;
mod subscription_store;

pub use pending_checkout_cache::{InMemoryPendingCheckoutCache, DEFAULT_CHECKOUT_TTL_SECS};
pub use subscription_store::{InMemorySubscriptionStore, StoreOperation};
