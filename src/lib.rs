//! Subscription Webhook - payment-provider event reconciliation
//!
//! Receives signed subscription callbacks from the payment provider,
//! verifies them over the raw body, and applies idempotent state
//! transitions to subscription records and an append-only payment log.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
