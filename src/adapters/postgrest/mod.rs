//! Hosted REST data API adapter.

mod subscription_store;

pub use subscription_store::{RestStoreConfig, RestSubscriptionStore};
