use async_trait::async_trait;

use tierscope_core::AppResult;
use tierscope_domain::{Principal, RoleFlags, UserAssignment, UserId};

/// Read port over the user directory and the assignment relation.
///
/// This is the only query capability the access resolver needs.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Finds one principal by id.
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>>;

    /// Loads the principals for the given ids. Unknown ids are skipped.
    async fn list_principals(&self, user_ids: &[UserId]) -> AppResult<Vec<Principal>>;

    /// Lists every principal in the directory.
    async fn list_all_principals(&self) -> AppResult<Vec<Principal>>;

    /// Lists `assigned_user_id` values of assignments owned by any of `manager_ids`.
    async fn list_assigned_user_ids(&self, manager_ids: &[UserId]) -> AppResult<Vec<UserId>>;
}

/// Input for creating an assignment edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Governing principal.
    pub manager_id: UserId,
    /// Governed principal.
    pub assigned_user_id: UserId,
    /// Acting principal.
    pub assigned_by: UserId,
}

/// Write port for the assignment relation and role flags.
#[async_trait]
pub trait HierarchyRepository: Send + Sync {
    /// Lists assignments, optionally restricted to the given managers.
    async fn list_assignments(
        &self,
        manager_ids: Option<&[UserId]>,
    ) -> AppResult<Vec<UserAssignment>>;

    /// Inserts an assignment. Duplicates are a conflict.
    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<UserAssignment>;

    /// Deletes an assignment and reports whether a row existed.
    async fn delete_assignment(&self, manager_id: UserId, user_id: UserId) -> AppResult<bool>;

    /// Replaces a user's role flags and drops every assignment touching the
    /// user. Returns the number of dropped assignments.
    async fn replace_role_flags(&self, user_id: UserId, flags: RoleFlags) -> AppResult<u64>;
}
