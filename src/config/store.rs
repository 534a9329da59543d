//! Subscription store configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which `SubscriptionStore` implementation to construct.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Direct PostgreSQL connection pool.
    #[default]
    Postgres,
    /// Hosted REST data API with a service key.
    Rest,
    /// Process memory; development only.
    Memory,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// PostgreSQL connection URL, or REST base URL
    #[serde(default)]
    pub url: String,

    /// Service credential for the REST backend
    pub service_key: Option<SecretString>,

    /// Minimum connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum connections allowed
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default)]
    pub run_migrations: bool,

    /// Deadline for all store interaction of one webhook delivery
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

impl StoreConfig {
    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=9).contains(&self.operation_timeout_secs) {
            return Err(ValidationError::InvalidStoreTimeout);
        }

        match self.backend {
            StoreBackend::Memory => Ok(()),
            StoreBackend::Postgres => {
                if self.url.is_empty() {
                    return Err(ValidationError::MissingRequired("STORE__URL"));
                }
                if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
                if self.min_connections > self.max_connections {
                    return Err(ValidationError::InvalidPoolSize);
                }
                if self.max_connections > 100 {
                    return Err(ValidationError::PoolSizeTooLarge);
                }
                Ok(())
            }
            StoreBackend::Rest => {
                if self.url.is_empty() {
                    return Err(ValidationError::MissingRequired("STORE__URL"));
                }
                if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
                    return Err(ValidationError::InvalidRestUrl);
                }
                let has_key = self
                    .service_key
                    .as_ref()
                    .is_some_and(|k| !k.expose_secret().trim().is_empty());
                if !has_key {
                    return Err(ValidationError::MissingRequired("STORE__SERVICE_KEY"));
                }
                Ok(())
            }
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: String::new(),
            service_key: None,
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    3
}

fn default_operation_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Postgres);
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_validation_missing_url() {
        assert_eq!(
            StoreConfig::default().validate(),
            Err(ValidationError::MissingRequired("STORE__URL"))
        );
    }

    #[test]
    fn test_validation_invalid_postgres_url() {
        assert_eq!(
            postgres("mysql://localhost/test").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn test_validation_invalid_pool_size() {
        let config = StoreConfig {
            min_connections: 10,
            max_connections: 5,
            ..postgres("postgresql://localhost/test")
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
    }

    #[test]
    fn test_validation_operation_timeout_bounds() {
        for secs in [0, 10, 30] {
            let config = StoreConfig {
                operation_timeout_secs: secs,
                ..postgres("postgresql://localhost/test")
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidStoreTimeout));
        }
    }

    #[test]
    fn test_rest_backend_requires_service_key() {
        let config = StoreConfig {
            backend: StoreBackend::Rest,
            url: "https://abc.example.co".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STORE__SERVICE_KEY"))
        );

        let config = StoreConfig {
            service_key: Some(SecretString::new("service-role-key".to_string())),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
