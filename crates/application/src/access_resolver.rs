use std::collections::BTreeSet;
use std::sync::Arc;

use tierscope_core::AppError;
use tierscope_domain::{AccessScope, AdminRole, Principal, RoleFlags, UserId};
use tracing::{debug, warn};

use crate::DirectoryRepository;

/// Computes the users an acting principal may read or mutate.
///
/// Resolution walks the assignment relation one hop for managers and two
/// hops for superior managers. Every hop re-checks the role flags of the
/// targets, so an assignment pointing at the wrong kind of user never widens
/// access. Query failures narrow the result to the principal alone.
#[derive(Clone)]
pub struct AccessResolver {
    directory: Arc<dyn DirectoryRepository>,
}

impl AccessResolver {
    /// Creates a resolver over the given directory port.
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self { directory }
    }

    /// Resolves the access scope of `principal`.
    pub async fn resolve(&self, principal: &Principal) -> AccessScope {
        let scope = match principal.role() {
            AdminRole::FullAdmin => AccessScope::Unrestricted,
            AdminRole::SuperiorManager => self.resolve_superior_manager(principal.id()).await,
            AdminRole::Manager => self.resolve_manager(principal.id()).await,
            AdminRole::None => AccessScope::Denied,
        };

        debug!(
            principal_id = %principal.id(),
            role = principal.role().as_str(),
            scope = scope.kind(),
            "resolved access scope"
        );

        scope
    }

    async fn resolve_manager(&self, principal_id: UserId) -> AccessScope {
        match self
            .verified_targets(&[principal_id], RoleFlags::is_end_user, ResolutionStep::Users)
            .await
        {
            Ok(users) => AccessScope::restricted(principal_id, users),
            Err(failure) => failure.into_scope(principal_id),
        }
    }

    async fn resolve_superior_manager(&self, principal_id: UserId) -> AccessScope {
        let managers = match self
            .verified_targets(
                &[principal_id],
                RoleFlags::is_plain_manager,
                ResolutionStep::Managers,
            )
            .await
        {
            Ok(managers) => managers,
            Err(failure) => return failure.into_scope(principal_id),
        };

        if managers.is_empty() {
            return AccessScope::only_self(principal_id);
        }

        let users = match self
            .verified_targets(&managers, RoleFlags::is_end_user, ResolutionStep::Users)
            .await
        {
            Ok(users) => users,
            Err(failure) => return failure.into_scope(principal_id),
        };

        AccessScope::restricted(principal_id, managers.into_iter().chain(users))
    }

    /// Lists the assignment targets of `manager_ids` whose flags satisfy `accept`.
    async fn verified_targets(
        &self,
        manager_ids: &[UserId],
        accept: fn(&RoleFlags) -> bool,
        step: ResolutionStep,
    ) -> Result<Vec<UserId>, ResolutionFailure> {
        let candidates: BTreeSet<UserId> = self
            .directory
            .list_assigned_user_ids(manager_ids)
            .await
            .map_err(|error| ResolutionFailure::new(step.assignments(), error))?
            .into_iter()
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let candidates: Vec<UserId> = candidates.into_iter().collect();
        let principals = self
            .directory
            .list_principals(&candidates)
            .await
            .map_err(|error| ResolutionFailure::new(step.verification(), error))?;

        Ok(principals
            .into_iter()
            .filter(|principal| accept(&principal.flags()))
            .map(|principal| principal.id())
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum ResolutionStep {
    Managers,
    Users,
}

impl ResolutionStep {
    fn assignments(self) -> &'static str {
        match self {
            Self::Managers => "list_candidate_managers",
            Self::Users => "list_candidate_users",
        }
    }

    fn verification(self) -> &'static str {
        match self {
            Self::Managers => "verify_managers",
            Self::Users => "verify_users",
        }
    }
}

struct ResolutionFailure {
    step: &'static str,
    error: AppError,
}

impl ResolutionFailure {
    fn new(step: &'static str, error: AppError) -> Self {
        Self { step, error }
    }

    fn into_scope(self, principal_id: UserId) -> AccessScope {
        warn!(
            principal_id = %principal_id,
            step = self.step,
            error = %self.error,
            "access resolution degraded to principal only"
        );

        AccessScope::degraded(principal_id, format!("{} failed: {}", self.step, self.error))
    }
}

#[cfg(test)]
mod tests;
