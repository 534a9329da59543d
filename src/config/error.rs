//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Store operation timeout must be between 1 and 9 seconds")]
    InvalidStoreTimeout,

    #[error("Request timeout ({request_secs}s) must exceed the store operation timeout ({store_secs}s)")]
    RequestTimeoutNotAboveStoreTimeout { request_secs: u64, store_secs: u64 },

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid REST store URL format")]
    InvalidRestUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Default currency must be a three-letter code")]
    InvalidCurrency,
}
