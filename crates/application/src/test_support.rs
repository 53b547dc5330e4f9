use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{
    AccessScope, AdminRole, Currency, PresenceStatus, Principal, RoleFlags, UserAssignment,
    UserId,
};

use crate::{
    AccessScopeCache, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, BalanceAdjustment, BalanceEntry, BalanceRepository, BalanceTransfer,
    DirectoryRepository, HierarchyRepository, NewAssignment, PresenceRecord, PresenceRepository,
};

#[derive(Default)]
pub(crate) struct FakeDirectory {
    principals: Mutex<HashMap<UserId, Principal>>,
    assignments: Mutex<Vec<UserAssignment>>,
    pub(crate) fail_assignment_lookup: AtomicBool,
    pub(crate) fail_principal_lookup: AtomicBool,
    pub(crate) assignment_queries: AtomicUsize,
}

impl FakeDirectory {
    pub(crate) async fn add_user(&self, name: &str, flags: RoleFlags) -> Principal {
        let principal = Principal::new(UserId::new(), name, None, flags);
        self.principals
            .lock()
            .await
            .insert(principal.id(), principal.clone());
        principal
    }

    pub(crate) async fn add_role(&self, name: &str, role: AdminRole) -> Principal {
        self.add_user(name, role.flags()).await
    }

    pub(crate) async fn link(&self, manager: &Principal, user: &Principal) {
        self.assignments.lock().await.push(UserAssignment {
            manager_id: manager.id(),
            assigned_user_id: user.id(),
            assigned_by: manager.id(),
            created_at: Utc::now(),
        });
    }

    pub(crate) async fn assignment_count(&self) -> usize {
        self.assignments.lock().await.len()
    }

    pub(crate) async fn flags_of(&self, user_id: UserId) -> Option<RoleFlags> {
        self.principals
            .lock()
            .await
            .get(&user_id)
            .map(Principal::flags)
    }
}

#[async_trait]
impl DirectoryRepository for FakeDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.lock().await.get(&user_id).cloned())
    }

    async fn list_principals(&self, user_ids: &[UserId]) -> AppResult<Vec<Principal>> {
        if self.fail_principal_lookup.load(Ordering::SeqCst) {
            return Err(AppError::Internal("users table unavailable".to_owned()));
        }

        let principals = self.principals.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| principals.get(user_id).cloned())
            .collect())
    }

    async fn list_all_principals(&self) -> AppResult<Vec<Principal>> {
        let mut principals: Vec<Principal> =
            self.principals.lock().await.values().cloned().collect();
        principals.sort_by_key(Principal::id);
        Ok(principals)
    }

    async fn list_assigned_user_ids(&self, manager_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        self.assignment_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_assignment_lookup.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "user_assignments table unavailable".to_owned(),
            ));
        }

        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| manager_ids.contains(&assignment.manager_id))
            .map(|assignment| assignment.assigned_user_id)
            .collect())
    }
}

#[async_trait]
impl HierarchyRepository for FakeDirectory {
    async fn list_assignments(
        &self,
        manager_ids: Option<&[UserId]>,
    ) -> AppResult<Vec<UserAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| {
                manager_ids.is_none_or(|manager_ids| manager_ids.contains(&assignment.manager_id))
            })
            .cloned()
            .collect())
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<UserAssignment> {
        let mut assignments = self.assignments.lock().await;
        if assignments.iter().any(|existing| {
            existing.manager_id == assignment.manager_id
                && existing.assigned_user_id == assignment.assigned_user_id
        }) {
            return Err(AppError::Conflict("assignment already exists".to_owned()));
        }

        let created = UserAssignment {
            manager_id: assignment.manager_id,
            assigned_user_id: assignment.assigned_user_id,
            assigned_by: assignment.assigned_by,
            created_at: Utc::now(),
        };
        assignments.push(created.clone());
        Ok(created)
    }

    async fn delete_assignment(&self, manager_id: UserId, user_id: UserId) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.manager_id == manager_id && assignment.assigned_user_id == user_id)
        });
        Ok(assignments.len() != before)
    }

    async fn replace_role_flags(&self, user_id: UserId, flags: RoleFlags) -> AppResult<u64> {
        let mut principals = self.principals.lock().await;
        let principal = principals
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;
        principals.insert(
            user_id,
            Principal::new(
                user_id,
                principal.display_name(),
                principal.email().map(str::to_owned),
                flags,
            ),
        );

        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            assignment.manager_id != user_id && assignment.assigned_user_id != user_id
        });
        Ok((before - assignments.len()) as u64)
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
    pub(crate) fail_writes: AtomicBool,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit_log_entries unavailable".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .enumerate()
            .rev()
            .skip(query.offset)
            .take(query.limit)
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: "2026-01-01T00:00:00Z".to_owned(),
            })
            .collect())
    }
}

#[derive(Default)]
struct FakeScopeState {
    generation: u64,
    entries: HashMap<UserId, AccessScope>,
}

#[derive(Default)]
pub(crate) struct FakeScopeCache {
    state: Mutex<FakeScopeState>,
}

#[async_trait]
impl AccessScopeCache for FakeScopeCache {
    async fn get_scope(&self, principal_id: UserId) -> AppResult<Option<AccessScope>> {
        Ok(self.state.lock().await.entries.get(&principal_id).cloned())
    }

    async fn generation(&self) -> AppResult<u64> {
        Ok(self.state.lock().await.generation)
    }

    async fn set_scope(
        &self,
        principal_id: UserId,
        scope: AccessScope,
        _ttl_seconds: u32,
        generation: u64,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.entries.insert(principal_id, scope);
        }
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.entries.clear();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeBalanceRepository {
    balances: Mutex<HashMap<(UserId, Currency), Decimal>>,
    pub(crate) transfers: Mutex<Vec<BalanceTransfer>>,
}

#[async_trait]
impl BalanceRepository for FakeBalanceRepository {
    async fn list_balances(&self, user_id: UserId) -> AppResult<Vec<BalanceEntry>> {
        Ok(self
            .balances
            .lock()
            .await
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((owner, currency), amount)| BalanceEntry {
                user_id: *owner,
                currency: *currency,
                amount: *amount,
                updated_at: Some(Utc::now()),
            })
            .collect())
    }

    async fn apply_adjustment(&self, adjustment: BalanceAdjustment) -> AppResult<BalanceTransfer> {
        let mut balances = self.balances.lock().await;
        let balance = balances
            .entry((adjustment.user_id, adjustment.currency))
            .or_insert(Decimal::ZERO);
        let next = *balance + adjustment.delta.amount();
        if next < Decimal::ZERO {
            return Err(AppError::Conflict("insufficient funds".to_owned()));
        }
        *balance = next;

        let mut transfers = self.transfers.lock().await;
        let transfer = BalanceTransfer {
            transfer_id: transfers.len().to_string(),
            user_id: adjustment.user_id,
            currency: adjustment.currency,
            delta: adjustment.delta.amount(),
            balance_after: next,
            performed_by: adjustment.performed_by,
            note: adjustment.note,
            created_at: Utc::now(),
        };
        transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn list_transfers(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<BalanceTransfer>> {
        Ok(self
            .transfers
            .lock()
            .await
            .iter()
            .rev()
            .filter(|transfer| transfer.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakePresenceRepository {
    records: Mutex<HashMap<UserId, PresenceRecord>>,
}

impl FakePresenceRepository {
    pub(crate) async fn seed(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        last_seen_at: DateTime<Utc>,
    ) {
        self.records.lock().await.insert(
            user_id,
            PresenceRecord {
                user_id,
                status,
                last_seen_at,
            },
        );
    }
}

#[async_trait]
impl PresenceRepository for FakePresenceRepository {
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
        self.records.lock().await.insert(user_id, record.clone());
        Ok(record)
    }

    async fn list_presence(&self, user_ids: Option<&[UserId]>) -> AppResult<Vec<PresenceRecord>> {
        let mut records: Vec<PresenceRecord> = self
            .records
            .lock()
            .await
            .values()
            .filter(|record| user_ids.is_none_or(|user_ids| user_ids.contains(&record.user_id)))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.user_id);
        Ok(records)
    }
}

pub(crate) fn identity(principal: &Principal) -> UserIdentity {
    UserIdentity::new(
        principal.id().to_string(),
        principal.display_name(),
        None,
    )
}
