//! Hosted REST implementation of SubscriptionStore.
//!
//! Talks to a PostgREST-style endpoint (`{base}/rest/v1/<table>`) with a
//! service key. Conflict handling is delegated to the server through the
//! `Prefer` header:
//!
//! - upsert: `resolution=merge-duplicates` with `on_conflict=email`
//! - payment insert: `resolution=ignore-duplicates` with `on_conflict=reference`

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::billing::{PaymentEvent, Subscription, SubscriptionPatch, SubscriptionUpsert};
use crate::domain::foundation::{DomainError, Email, ErrorCode};
use crate::ports::{InsertOutcome, SubscriptionStore};

const SUBSCRIPTIONS_TABLE: &str = "subscriptions";
const PAYMENT_EVENTS_TABLE: &str = "payment_events";

/// REST store configuration.
#[derive(Clone)]
pub struct RestStoreConfig {
    /// Project base URL, e.g. `https://abc.example.co`.
    base_url: String,
    /// Service credential sent as `apikey` and bearer token.
    service_key: SecretString,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, service_key: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// SubscriptionStore backed by a hosted REST data API.
pub struct RestSubscriptionStore {
    config: RestStoreConfig,
    http_client: reqwest::Client,
}

impl RestSubscriptionStore {
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(config: RestStoreConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.config.service_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, DomainError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            DomainError::new(ErrorCode::StoreUnavailable, format!("Failed to {}: {}", action, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, error = %body, "REST store {} failed", action);
        Err(DomainError::new(
            error_code_for(status),
            format!("Failed to {}: {} {}", action, status, body),
        ))
    }

    async fn rows<T: serde::de::DeserializeOwned>(
        response: Response,
        action: &str,
    ) -> Result<Vec<T>, DomainError> {
        response.json().await.map_err(|e| {
            DomainError::database(format!("Failed to parse {} response: {}", action, e))
        })
    }
}

fn error_code_for(status: StatusCode) -> ErrorCode {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        ErrorCode::StoreUnavailable
    } else {
        ErrorCode::DatabaseError
    }
}

fn eq_filter(email: &Email) -> String {
    format!("eq.{}", email.as_str())
}

#[async_trait]
impl SubscriptionStore for RestSubscriptionStore {
    async fn upsert_subscription(&self, upsert: &SubscriptionUpsert) -> Result<(), DomainError> {
        let request = self
            .http_client
            .post(self.config.table_url(SUBSCRIPTIONS_TABLE))
            .query(&[("on_conflict", "email")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(upsert);

        self.send(request, "upsert subscription").await?;
        Ok(())
    }

    async fn update_subscription(
        &self,
        email: &Email,
        patch: &SubscriptionPatch,
    ) -> Result<u64, DomainError> {
        let request = self
            .http_client
            .patch(self.config.table_url(SUBSCRIPTIONS_TABLE))
            .query(&[("email", eq_filter(email))])
            .header("Prefer", "return=representation")
            .json(patch);

        let response = self.send(request, "update subscription").await?;
        let rows: Vec<serde_json::Value> = Self::rows(response, "update subscription").await?;
        Ok(rows.len() as u64)
    }

    async fn insert_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<InsertOutcome, DomainError> {
        let request = self
            .http_client
            .post(self.config.table_url(PAYMENT_EVENTS_TABLE))
            .query(&[("on_conflict", "reference")])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(event);

        let response = self.send(request, "insert payment event").await?;
        let rows: Vec<serde_json::Value> = Self::rows(response, "insert payment event").await?;
        if rows.is_empty() {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn find_subscription(&self, email: &Email) -> Result<Option<Subscription>, DomainError> {
        let request = self
            .http_client
            .get(self.config.table_url(SUBSCRIPTIONS_TABLE))
            .query(&[("email", eq_filter(email)), ("select", "*".to_string())]);

        let response = self.send(request, "load subscription").await?;
        let rows: Vec<Subscription> = Self::rows(response, "load subscription").await?;
        Ok(rows.into_iter().next())
    }

    async fn list_payment_events(&self, email: &Email) -> Result<Vec<PaymentEvent>, DomainError> {
        let request = self
            .http_client
            .get(self.config.table_url(PAYMENT_EVENTS_TABLE))
            .query(&[
                ("email", eq_filter(email)),
                (
                    "select",
                    "email,reference,amount,currency,status,paid_at".to_string(),
                ),
                ("order", "paid_at.asc".to_string()),
            ]);

        let response = self.send(request, "list payment events").await?;
        Self::rows(response, "list payment events").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionStatus;
    use crate::domain::foundation::Timestamp;
    use axum::extract::{Query, State};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Requests seen by the fake REST server.
    #[derive(Default)]
    struct Recorded {
        prefer: Vec<String>,
        queries: Vec<HashMap<String, String>>,
        bodies: Vec<Value>,
        references: Vec<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn record(
        State(state): State<Shared>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let mut recorded = state.lock().unwrap();
        recorded.prefer.push(
            headers
                .get("prefer")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        );
        recorded.queries.push(query);

        let reference = body.get("reference").and_then(Value::as_str).map(str::to_string);
        recorded.bodies.push(body.clone());

        match reference {
            Some(r) if recorded.references.contains(&r) => Json(json!([])),
            Some(r) => {
                recorded.references.push(r);
                Json(json!([body]))
            }
            None => Json(json!([])),
        }
    }

    async fn fake_server() -> (String, Shared) {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/rest/v1/subscriptions", post(record).patch(record))
            .route("/rest/v1/payment_events", post(record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    fn store(base_url: &str) -> RestSubscriptionStore {
        RestSubscriptionStore::new(RestStoreConfig::new(
            base_url,
            SecretString::new("service-key".to_string()),
        ))
    }

    fn email() -> Email {
        Email::parse("owner@diner.ng").unwrap()
    }

    #[test]
    fn table_url_trims_trailing_slash() {
        let config = RestStoreConfig::new(
            "https://abc.example.co/",
            SecretString::new("k".to_string()),
        );
        assert_eq!(
            config.table_url("subscriptions"),
            "https://abc.example.co/rest/v1/subscriptions"
        );
    }

    #[test]
    fn server_errors_are_store_unavailable() {
        assert_eq!(
            error_code_for(StatusCode::SERVICE_UNAVAILABLE),
            ErrorCode::StoreUnavailable
        );
        assert_eq!(
            error_code_for(StatusCode::TOO_MANY_REQUESTS),
            ErrorCode::StoreUnavailable
        );
        assert_eq!(error_code_for(StatusCode::CONFLICT), ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn upsert_requests_merge_on_email() {
        let (base_url, state) = fake_server().await;
        let upsert = SubscriptionUpsert {
            email: email(),
            customer_code: None,
            business_name: Some("Jane's Diner".to_string()),
            plan_type: None,
            plan_code: Some("PLN_pro".to_string()),
            plan_name: None,
            subscription_code: None,
            status: SubscriptionStatus::Active,
            amount: Some(Decimal::new(9_999_900, 2)),
            currency: Some("NGN".to_string()),
            next_payment_date: None,
            updated_at: Timestamp::now(),
        };

        store(&base_url).upsert_subscription(&upsert).await.unwrap();

        let recorded = state.lock().unwrap();
        assert!(recorded.prefer[0].contains("resolution=merge-duplicates"));
        assert_eq!(recorded.queries[0].get("on_conflict").map(String::as_str), Some("email"));
        assert_eq!(recorded.bodies[0]["email"], "owner@diner.ng");
        assert_eq!(recorded.bodies[0]["status"], "active");
    }

    #[tokio::test]
    async fn duplicate_payment_reference_is_reported() {
        let (base_url, state) = fake_server().await;
        let store = store(&base_url);
        let event = PaymentEvent::success(
            email(),
            "T100",
            Decimal::new(2_500_000, 2),
            "NGN",
            Timestamp::now(),
        );

        assert_eq!(
            store.insert_payment_event(&event).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_payment_event(&event).await.unwrap(),
            InsertOutcome::Duplicate
        );

        let recorded = state.lock().unwrap();
        assert!(recorded.prefer[0].contains("resolution=ignore-duplicates"));
    }

    #[tokio::test]
    async fn update_filters_by_email_and_counts_rows() {
        let (base_url, state) = fake_server().await;

        let touched = store(&base_url)
            .update_subscription(&email(), &SubscriptionPatch::disabled(Timestamp::now()))
            .await
            .unwrap();

        assert_eq!(touched, 0);
        let recorded = state.lock().unwrap();
        assert_eq!(
            recorded.queries[0].get("email").map(String::as_str),
            Some("eq.owner@diner.ng")
        );
        assert_eq!(recorded.bodies[0]["status"], "inactive");
        assert!(recorded.bodies[0].get("cancelled_at").is_none());
    }

    #[tokio::test]
    async fn unreachable_server_is_store_unavailable() {
        let err = store("http://127.0.0.1:9")
            .find_subscription(&email())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }
}
