use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tierscope_application::{DirectoryRepository, HierarchyRepository, NewAssignment};
use tierscope_core::{AppError, AppResult};
use tierscope_domain::{Principal, RoleFlags, UserAssignment, UserId};

#[derive(Default)]
struct DirectoryState {
    principals: HashMap<UserId, Principal>,
    assignments: Vec<UserAssignment>,
}

/// In-memory user directory and assignment store.
#[derive(Default)]
pub struct InMemoryDirectoryRepository {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one user.
    pub async fn upsert_user(&self, principal: Principal) {
        self.state
            .write()
            .await
            .principals
            .insert(principal.id(), principal);
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.state.read().await.principals.get(&user_id).cloned())
    }

    async fn list_principals(&self, user_ids: &[UserId]) -> AppResult<Vec<Principal>> {
        let state = self.state.read().await;
        let mut principals: Vec<Principal> = user_ids
            .iter()
            .filter_map(|user_id| state.principals.get(user_id).cloned())
            .collect();
        principals.sort_by_key(Principal::id);
        principals.dedup_by_key(|principal| principal.id());
        Ok(principals)
    }

    async fn list_all_principals(&self) -> AppResult<Vec<Principal>> {
        let mut principals: Vec<Principal> =
            self.state.read().await.principals.values().cloned().collect();
        principals.sort_by_key(Principal::id);
        Ok(principals)
    }

    async fn list_assigned_user_ids(&self, manager_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        let mut user_ids: Vec<UserId> = self
            .state
            .read()
            .await
            .assignments
            .iter()
            .filter(|assignment| manager_ids.contains(&assignment.manager_id))
            .map(|assignment| assignment.assigned_user_id)
            .collect();
        user_ids.sort();
        user_ids.dedup();
        Ok(user_ids)
    }
}

#[async_trait]
impl HierarchyRepository for InMemoryDirectoryRepository {
    async fn list_assignments(
        &self,
        manager_ids: Option<&[UserId]>,
    ) -> AppResult<Vec<UserAssignment>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .iter()
            .filter(|assignment| {
                manager_ids.is_none_or(|manager_ids| manager_ids.contains(&assignment.manager_id))
            })
            .cloned()
            .collect())
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<UserAssignment> {
        let mut state = self.state.write().await;
        if state.assignments.iter().any(|existing| {
            existing.manager_id == assignment.manager_id
                && existing.assigned_user_id == assignment.assigned_user_id
        }) {
            return Err(AppError::Conflict(format!(
                "user '{}' is already assigned to '{}'",
                assignment.assigned_user_id, assignment.manager_id
            )));
        }

        let created = UserAssignment {
            manager_id: assignment.manager_id,
            assigned_user_id: assignment.assigned_user_id,
            assigned_by: assignment.assigned_by,
            created_at: Utc::now(),
        };
        state.assignments.push(created.clone());
        Ok(created)
    }

    async fn delete_assignment(&self, manager_id: UserId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.assignments.len();
        state.assignments.retain(|assignment| {
            assignment.manager_id != manager_id || assignment.assigned_user_id != user_id
        });
        Ok(state.assignments.len() != before)
    }

    async fn replace_role_flags(&self, user_id: UserId, flags: RoleFlags) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let principal = state
            .principals
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;
        state.principals.insert(
            user_id,
            Principal::new(
                user_id,
                principal.display_name(),
                principal.email().map(str::to_owned),
                flags,
            ),
        );

        let before = state.assignments.len();
        state.assignments.retain(|assignment| {
            assignment.manager_id != user_id && assignment.assigned_user_id != user_id
        });
        Ok(u64::try_from(before - state.assignments.len()).unwrap_or(u64::MAX))
    }
}
