//! Process bootstrap for the subscription webhook service.

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use subscription_webhook::adapters::http::{app_router, RouterConfig, WebhookAppState};
use subscription_webhook::adapters::{
    InMemorySubscriptionStore, PostgresSubscriptionStore, RestStoreConfig, RestSubscriptionStore,
};
use subscription_webhook::application::ProcessPaystackWebhookHandler;
use subscription_webhook::config::{AppConfig, ConfigError, StoreBackend, StoreConfig, ValidationError};
use subscription_webhook::domain::billing::WebhookVerifier;
use subscription_webhook::domain::foundation::DomainError;
use subscription_webhook::ports::SubscriptionStore;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store initialization failed: {0}")]
    Store(#[from] DomainError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration rejected");
        return Err(e.into());
    }

    let store = build_store(&config.store).await?;
    let verifier = config
        .payment
        .webhook_secret
        .clone()
        .and_then(WebhookVerifier::new);

    let handler = ProcessPaystackWebhookHandler::new(
        store,
        verifier,
        config.payment.default_currency.clone(),
        config.store.operation_timeout(),
    );

    let router = app_router(
        WebhookAppState::new(handler),
        &RouterConfig {
            cors_origins: config.server.cors_origins_list(),
            request_timeout: config.server.request_timeout(),
        },
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        store = ?config.store.backend,
        "Subscription webhook listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_store(config: &StoreConfig) -> Result<Arc<dyn SubscriptionStore>, StartupError> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = PostgresSubscriptionStore::connect(
                &config.url,
                config.max_connections,
                config.min_connections,
                config.acquire_timeout(),
            )
            .await?;
            if config.run_migrations {
                store.run_migrations().await?;
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Rest => {
            let service_key = config
                .service_key
                .clone()
                .ok_or(ValidationError::MissingRequired("STORE__SERVICE_KEY"))?;
            let client = reqwest::Client::builder()
                .timeout(config.operation_timeout())
                .build()
                .map_err(|e| DomainError::database(format!("Failed to build HTTP client: {}", e)))?;
            Ok(Arc::new(RestSubscriptionStore::with_client(
                RestStoreConfig::new(config.url.clone(), service_key),
                client,
            )))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory subscription store; data is lost on restart");
            Ok(Arc::new(InMemorySubscriptionStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
