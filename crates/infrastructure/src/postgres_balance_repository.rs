use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use tierscope_application::{BalanceAdjustment, BalanceEntry, BalanceRepository, BalanceTransfer};
use tierscope_core::{AppError, AppResult};
use tierscope_domain::{Currency, MAX_AMOUNT, UserId};

const NUMERIC_OVERFLOW: &str = "22003";

/// PostgreSQL-backed balances with an append-only transfer ledger.
#[derive(Clone)]
pub struct PostgresBalanceRepository {
    pool: PgPool,
}

impl PostgresBalanceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BalanceRow {
    user_id: uuid::Uuid,
    currency: String,
    amount: Decimal,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct TransferRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    currency: String,
    delta: Decimal,
    balance_after: Decimal,
    performed_by: uuid::Uuid,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransferRow {
    fn into_transfer(self) -> AppResult<BalanceTransfer> {
        Ok(BalanceTransfer {
            transfer_id: self.id.to_string(),
            user_id: UserId::from_uuid(self.user_id),
            currency: Currency::from_str(self.currency.as_str())?,
            delta: self.delta,
            balance_after: self.balance_after,
            performed_by: UserId::from_uuid(self.performed_by),
            note: self.note,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl BalanceRepository for PostgresBalanceRepository {
    async fn list_balances(&self, user_id: UserId) -> AppResult<Vec<BalanceEntry>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT user_id, currency, amount, updated_at
            FROM user_balances
            WHERE user_id = $1
            ORDER BY currency
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list balances: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(BalanceEntry {
                    user_id: UserId::from_uuid(row.user_id),
                    currency: Currency::from_str(row.currency.as_str())?,
                    amount: row.amount,
                    updated_at: Some(row.updated_at),
                })
            })
            .collect()
    }

    async fn apply_adjustment(&self, adjustment: BalanceAdjustment) -> AppResult<BalanceTransfer> {
        let delta = adjustment.delta.amount();
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO user_balances (user_id, currency, amount)
            VALUES ($1, $2, 0)
            ON CONFLICT (user_id, currency) DO NOTHING
            "#,
        )
        .bind(adjustment.user_id.as_uuid())
        .bind(adjustment.currency.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to open balance: {error}")))?;

        // Single conditional statement: the row lock serializes concurrent adjustments.
        let balance_after = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE user_balances
            SET amount = amount + $3,
                updated_at = now()
            WHERE user_id = $1
                AND currency = $2
                AND amount + $3 >= 0
            RETURNING amount
            "#,
        )
        .bind(adjustment.user_id.as_uuid())
        .bind(adjustment.currency.as_str())
        .bind(delta)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some(NUMERIC_OVERFLOW)
            {
                return AppError::Conflict(format!(
                    "{} balance of user '{}' would exceed {MAX_AMOUNT}",
                    adjustment.currency.as_str(),
                    adjustment.user_id
                ));
            }

            AppError::Internal(format!("failed to adjust balance: {error}"))
        })?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "insufficient {} funds for user '{}'",
                adjustment.currency.as_str(),
                adjustment.user_id
            ))
        })?;

        let row = sqlx::query_as::<_, TransferRow>(
            r#"
            INSERT INTO balance_transfers (
                user_id,
                currency,
                delta,
                balance_after,
                performed_by,
                note
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, currency, delta, balance_after, performed_by, note, created_at
            "#,
        )
        .bind(adjustment.user_id.as_uuid())
        .bind(adjustment.currency.as_str())
        .bind(delta)
        .bind(balance_after)
        .bind(adjustment.performed_by.as_uuid())
        .bind(adjustment.note)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record transfer: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        row.into_transfer()
    }

    async fn list_transfers(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<BalanceTransfer>> {
        let capped_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, user_id, currency, delta, balance_after, performed_by, note, created_at
            FROM balance_transfers
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(capped_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list transfers: {error}")))?;

        rows.into_iter().map(TransferRow::into_transfer).collect()
    }
}
