//! PostgreSQL implementation of SubscriptionStore.
//!
//! Idempotency is pushed to the database: the upsert conflicts on the
//! `email` primary key and payment inserts conflict on the unique
//! `reference` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::domain::billing::{
    PaymentEvent, PaymentStatus, PlanType, Subscription, SubscriptionPatch, SubscriptionUpsert,
};
use crate::domain::foundation::{DomainError, Email, ErrorCode, Timestamp};
use crate::ports::{InsertOutcome, SubscriptionStore};

/// PostgreSQL implementation of the SubscriptionStore port.
#[derive(Clone)]
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and wraps it.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DomainError> {
        tracing::info!(max_connections, min_connections, "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::StoreUnavailable, format!("Failed to connect: {}", e))
            })?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), DomainError> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    email: String,
    customer_code: Option<String>,
    business_name: Option<String>,
    plan_type: Option<String>,
    plan_code: Option<String>,
    plan_name: Option<String>,
    subscription_code: Option<String>,
    status: String,
    amount: Option<Decimal>,
    currency: Option<String>,
    next_payment_date: Option<DateTime<Utc>>,
    last_payment_date: Option<DateTime<Utc>>,
    last_payment_reference: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let plan_type = row
            .plan_type
            .as_deref()
            .map(str::parse::<PlanType>)
            .transpose()
            .map_err(|e| corrupt_row("plan_type", e))?;

        Ok(Subscription {
            email: Email::parse(&row.email).map_err(|e| corrupt_row("email", e))?,
            customer_code: row.customer_code,
            business_name: row.business_name,
            plan_type,
            plan_code: row.plan_code,
            plan_name: row.plan_name,
            subscription_code: row.subscription_code,
            status: row.status.parse().map_err(|e| corrupt_row("status", e))?,
            amount: row.amount,
            currency: row.currency,
            next_payment_date: row.next_payment_date.map(Timestamp::from_datetime),
            last_payment_date: row.last_payment_date.map(Timestamp::from_datetime),
            last_payment_reference: row.last_payment_reference,
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a payment event.
#[derive(Debug, sqlx::FromRow)]
struct PaymentEventRow {
    email: String,
    reference: String,
    amount: Decimal,
    currency: String,
    status: String,
    paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentEventRow> for PaymentEvent {
    type Error = DomainError;

    fn try_from(row: PaymentEventRow) -> Result<Self, Self::Error> {
        Ok(PaymentEvent {
            email: Email::parse(&row.email).map_err(|e| corrupt_row("email", e))?,
            reference: row.reference,
            amount: row.amount,
            currency: row.currency,
            status: row
                .status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt_row("status", e))?,
            paid_at: Timestamp::from_datetime(row.paid_at),
        })
    }
}

fn corrupt_row(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid {} value: {}", column, err))
}

fn query_failed(action: &str, err: sqlx::Error) -> DomainError {
    let code = match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorCode::StoreUnavailable
        }
        _ => ErrorCode::DatabaseError,
    };
    DomainError::new(code, format!("Failed to {}: {}", action, err))
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn upsert_subscription(&self, upsert: &SubscriptionUpsert) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                email, customer_code, business_name, plan_type, plan_code, plan_name,
                subscription_code, status, amount, currency, next_payment_date,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ON CONFLICT (email) DO UPDATE SET
                customer_code = EXCLUDED.customer_code,
                business_name = EXCLUDED.business_name,
                plan_type = EXCLUDED.plan_type,
                plan_code = EXCLUDED.plan_code,
                plan_name = EXCLUDED.plan_name,
                subscription_code = EXCLUDED.subscription_code,
                status = EXCLUDED.status,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                next_payment_date = EXCLUDED.next_payment_date,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(upsert.email.as_str())
        .bind(&upsert.customer_code)
        .bind(&upsert.business_name)
        .bind(upsert.plan_type.map(|p| p.as_str()))
        .bind(&upsert.plan_code)
        .bind(&upsert.plan_name)
        .bind(&upsert.subscription_code)
        .bind(upsert.status.as_str())
        .bind(upsert.amount)
        .bind(&upsert.currency)
        .bind(upsert.next_payment_date.map(|t| *t.as_datetime()))
        .bind(upsert.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("upsert subscription", e))?;

        Ok(())
    }

    async fn update_subscription(
        &self,
        email: &Email,
        patch: &SubscriptionPatch,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = COALESCE($2, status),
                last_payment_date = COALESCE($3, last_payment_date),
                last_payment_reference = COALESCE($4, last_payment_reference),
                cancelled_at = COALESCE($5, cancelled_at),
                updated_at = $6
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.last_payment_date.map(|t| *t.as_datetime()))
        .bind(&patch.last_payment_reference)
        .bind(patch.cancelled_at.map(|t| *t.as_datetime()))
        .bind(patch.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("update subscription", e))?;

        Ok(result.rows_affected())
    }

    async fn insert_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_events (email, reference, amount, currency, status, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference) DO NOTHING
            "#,
        )
        .bind(event.email.as_str())
        .bind(&event.reference)
        .bind(event.amount)
        .bind(&event.currency)
        .bind(event.status.as_str())
        .bind(event.paid_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("insert payment event", e))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn find_subscription(&self, email: &Email) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT email, customer_code, business_name, plan_type, plan_code, plan_name,
                   subscription_code, status, amount, currency, next_payment_date,
                   last_payment_date, last_payment_reference, cancelled_at,
                   created_at, updated_at
            FROM subscriptions
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("load subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn list_payment_events(&self, email: &Email) -> Result<Vec<PaymentEvent>, DomainError> {
        let rows: Vec<PaymentEventRow> = sqlx::query_as(
            r#"
            SELECT email, reference, amount, currency, status, paid_at
            FROM payment_events
            WHERE email = $1
            ORDER BY paid_at ASC, id ASC
            "#,
        )
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list payment events", e))?;

        rows.into_iter().map(PaymentEvent::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionStatus;

    fn row(status: &str, plan_type: Option<&str>) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            email: "owner@diner.ng".to_string(),
            customer_code: Some("CUS_1".to_string()),
            business_name: Some("Jane's Diner".to_string()),
            plan_type: plan_type.map(str::to_string),
            plan_code: Some("PLN_pro".to_string()),
            plan_name: None,
            subscription_code: None,
            status: status.to_string(),
            amount: Some(Decimal::new(2_500_000, 2)),
            currency: Some("NGN".to_string()),
            next_payment_date: None,
            last_payment_date: None,
            last_payment_reference: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_subscription() {
        let subscription = Subscription::try_from(row("payment_failed", Some("pro"))).unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::PaymentFailed);
        assert_eq!(subscription.plan_type, Some(PlanType::Pro));
        assert_eq!(subscription.amount.unwrap().to_string(), "25000.00");
    }

    #[test]
    fn row_with_unknown_status_is_database_error() {
        let err = Subscription::try_from(row("frozen", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn payment_row_converts() {
        let event = PaymentEvent::try_from(PaymentEventRow {
            email: "owner@diner.ng".to_string(),
            reference: "failed_1700000000000".to_string(),
            amount: Decimal::ZERO,
            currency: "NGN".to_string(),
            status: "failed".to_string(),
            paid_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(event.status, PaymentStatus::Failed);
    }

    #[test]
    fn pool_timeout_maps_to_store_unavailable() {
        let err = query_failed("load subscription", sqlx::Error::PoolTimedOut);
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }
}
