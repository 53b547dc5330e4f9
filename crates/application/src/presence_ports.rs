use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tierscope_core::AppResult;
use tierscope_domain::{PresenceStatus, UserId};

/// Stored presence row as last reported by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    /// Reporting user.
    pub user_id: UserId,
    /// Reported status.
    pub status: PresenceStatus,
    /// Last heartbeat.
    pub last_seen_at: DateTime<Utc>,
}

/// Presence projection with the online window applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    /// Reporting user.
    pub user_id: UserId,
    /// Effective status.
    pub status: PresenceStatus,
    /// Last heartbeat.
    pub last_seen_at: DateTime<Utc>,
}

/// Repository port for presence rows.
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Inserts or refreshes one user's presence row.
    async fn upsert_presence(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        seen_at: DateTime<Utc>,
    ) -> AppResult<PresenceRecord>;

    /// Lists presence rows, optionally restricted to `user_ids`.
    async fn list_presence(&self, user_ids: Option<&[UserId]>) -> AppResult<Vec<PresenceRecord>>;
}
