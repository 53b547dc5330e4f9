use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use tierscope_application::{PresenceRecord, PresenceRepository};
use tierscope_core::{AppError, AppResult};
use tierscope_domain::{PresenceStatus, UserId};

/// PostgreSQL-backed presence store.
#[derive(Clone)]
pub struct PostgresPresenceRepository {
    pool: PgPool,
}

impl PostgresPresenceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PresenceRow {
    user_id: uuid::Uuid,
    status: String,
    last_seen_at: DateTime<Utc>,
}

impl PresenceRow {
    fn into_record(self) -> AppResult<PresenceRecord> {
        Ok(PresenceRecord {
            user_id: UserId::from_uuid(self.user_id),
            status: PresenceStatus::from_str(self.status.as_str())?,
            last_seen_at: self.last_seen_at,
        })
    }
}

#[async_trait]
impl PresenceRepository for PostgresPresenceRepository {
    async fn upsert_presence(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        seen_at: DateTime<Utc>,
    ) -> AppResult<PresenceRecord> {
        let row = sqlx::query_as::<_, PresenceRow>(
            r#"
            INSERT INTO user_presence (user_id, status, last_seen_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET status = EXCLUDED.status,
                last_seen_at = EXCLUDED.last_seen_at
            RETURNING user_id, status, last_seen_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(status.as_str())
        .bind(seen_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record presence: {error}")))?;

        row.into_record()
    }

    async fn list_presence(&self, user_ids: Option<&[UserId]>) -> AppResult<Vec<PresenceRecord>> {
        let rows = sqlx::query_as::<_, PresenceRow>(
            r#"
            SELECT user_id, status, last_seen_at
            FROM user_presence
            WHERE $1::UUID[] IS NULL OR user_id = ANY($1)
            ORDER BY last_seen_at DESC
            "#,
        )
        .bind(user_ids.map(|user_ids| user_ids.iter().map(UserId::as_uuid).collect::<Vec<_>>()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list presence: {error}")))?;

        rows.into_iter().map(PresenceRow::into_record).collect()
    }
}
