use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use tierscope_application::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    BalanceAdjustment, BalanceEntry, BalanceRepository, BalanceTransfer, PresenceRecord,
    PresenceRepository,
};
use tierscope_core::{AppError, AppResult};
use tierscope_domain::{Currency, MAX_AMOUNT, PresenceStatus, UserId};

#[derive(Debug, Clone)]
struct StoredAuditEvent {
    event: AuditEvent,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct ActivityState {
    balances: HashMap<(UserId, Currency), BalanceEntry>,
    transfers: Vec<BalanceTransfer>,
    presence: HashMap<UserId, PresenceRecord>,
    audit_events: Vec<StoredAuditEvent>,
}

/// In-memory balances, presence and audit trail. Writes share one lock.
#[derive(Default)]
pub struct InMemoryActivityRepository {
    state: RwLock<ActivityState>,
}

impl InMemoryActivityRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceRepository for InMemoryActivityRepository {
    async fn list_balances(&self, user_id: UserId) -> AppResult<Vec<BalanceEntry>> {
        let mut balances: Vec<BalanceEntry> = self
            .state
            .read()
            .await
            .balances
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        balances.sort_by_key(|entry| entry.currency);
        Ok(balances)
    }

    async fn apply_adjustment(&self, adjustment: BalanceAdjustment) -> AppResult<BalanceTransfer> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let key = (adjustment.user_id, adjustment.currency);
        let current = state
            .balances
            .get(&key)
            .map_or(Decimal::ZERO, |entry| entry.amount);
        let balance_after = current + adjustment.delta.amount();
        if balance_after < Decimal::ZERO {
            return Err(AppError::Conflict(format!(
                "insufficient {} funds for user '{}'",
                adjustment.currency.as_str(),
                adjustment.user_id
            )));
        }
        if balance_after >= MAX_AMOUNT {
            return Err(AppError::Conflict(format!(
                "{} balance of user '{}' would exceed {MAX_AMOUNT}",
                adjustment.currency.as_str(),
                adjustment.user_id
            )));
        }

        state.balances.insert(
            key,
            BalanceEntry {
                user_id: adjustment.user_id,
                currency: adjustment.currency,
                amount: balance_after,
                updated_at: Some(now),
            },
        );

        let transfer = BalanceTransfer {
            transfer_id: uuid::Uuid::new_v4().to_string(),
            user_id: adjustment.user_id,
            currency: adjustment.currency,
            delta: adjustment.delta.amount(),
            balance_after,
            performed_by: adjustment.performed_by,
            note: adjustment.note,
            created_at: now,
        };
        state.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn list_transfers(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<BalanceTransfer>> {
        Ok(self
            .state
            .read()
            .await
            .transfers
            .iter()
            .rev()
            .filter(|transfer| transfer.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PresenceRepository for InMemoryActivityRepository {
    async fn upsert_presence(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        seen_at: DateTime<Utc>,
    ) -> AppResult<PresenceRecord> {
        let record = PresenceRecord {
            user_id,
            status,
            last_seen_at: seen_at,
        };
        self.state
            .write()
            .await
            .presence
            .insert(user_id, record.clone());
        Ok(record)
    }

    async fn list_presence(&self, user_ids: Option<&[UserId]>) -> AppResult<Vec<PresenceRecord>> {
        let mut records: Vec<PresenceRecord> = self
            .state
            .read()
            .await
            .presence
            .values()
            .filter(|record| user_ids.is_none_or(|user_ids| user_ids.contains(&record.user_id)))
            .cloned()
            .collect();
        records.sort_by(|left, right| right.last_seen_at.cmp(&left.last_seen_at));
        Ok(records)
    }
}

#[async_trait]
impl AuditRepository for InMemoryActivityRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(StoredAuditEvent {
            event,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryActivityRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .state
            .read()
            .await
            .audit_events
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, stored)| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| stored.event.action.as_str() == action)
                    && query
                        .subject
                        .as_deref()
                        .is_none_or(|subject| stored.event.subject == subject)
            })
            .skip(query.offset)
            .take(query.limit.clamp(1, 200))
            .map(|(index, stored)| AuditLogEntry {
                event_id: index.to_string(),
                subject: stored.event.subject.clone(),
                action: stored.event.action.as_str().to_owned(),
                resource_type: stored.event.resource_type.clone(),
                resource_id: stored.event.resource_id.clone(),
                detail: stored.event.detail.clone(),
                created_at: stored.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            })
            .collect())
    }
}
