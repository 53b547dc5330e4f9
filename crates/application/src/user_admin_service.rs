use std::sync::Arc;

use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{AdminRole, AuditAction, Principal, UserId};
use tracing::info;

use crate::{
    AccessService, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, DirectoryRepository, HierarchyRepository, append_committed_event,
};

/// Application service for user listing, role administration and audit reads.
#[derive(Clone)]
pub struct UserAdminService {
    access_service: AccessService,
    directory: Arc<dyn DirectoryRepository>,
    hierarchy_repository: Arc<dyn HierarchyRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl UserAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        directory: Arc<dyn DirectoryRepository>,
        hierarchy_repository: Arc<dyn HierarchyRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            access_service,
            directory,
            hierarchy_repository,
            audit_repository,
            audit_log_repository,
        }
    }

    /// Lists the users inside the acting principal's scope.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<Principal>> {
        let scope = self.access_service.scope_for(actor).await?;
        if scope.is_denied() {
            return Err(AppError::Forbidden(
                "user management requires an administrative role".to_owned(),
            ));
        }

        let mut users = match scope.id_filter() {
            None => self.directory.list_all_principals().await?,
            Some(user_ids) => self.directory.list_principals(&user_ids).await?,
        };
        users.sort_by(|left, right| {
            left.display_name()
                .cmp(right.display_name())
                .then_with(|| left.id().cmp(&right.id()))
        });

        Ok(users)
    }

    /// Returns one user inside the acting principal's scope.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<Principal> {
        self.access_service.require_access(actor, user_id).await?;

        self.directory
            .find_principal(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    /// Changes a user's role. Only full administrators may do this.
    ///
    /// Every assignment touching the user is dropped. Setting the role the
    /// user already has is a no-op.
    pub async fn set_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role: AdminRole,
    ) -> AppResult<Principal> {
        let principal = self
            .access_service
            .require_role(actor, &[AdminRole::FullAdmin])
            .await?;

        if principal.id() == user_id {
            return Err(AppError::Validation(
                "administrators cannot change their own role".to_owned(),
            ));
        }

        let target = self
            .directory
            .find_principal(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        let previous_role = target.role();
        if previous_role == role {
            return Ok(target);
        }

        let dropped_assignments = self
            .hierarchy_repository
            .replace_role_flags(user_id, role.flags())
            .await?;

        self.access_service.invalidate_all().await?;
        append_committed_event(
            self.audit_repository.as_ref(),
            AuditEvent {
                subject: principal.id().to_string(),
                action: AuditAction::UserRoleUpdated,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "changed role of '{}' from '{}' to '{}', dropped {dropped_assignments} assignments",
                    target.display_name(),
                    previous_role.as_str(),
                    role.as_str()
                )),
            },
        )
        .await;

        info!(
            actor_id = %principal.id(),
            user_id = %user_id,
            from = previous_role.as_str(),
            to = role.as_str(),
            dropped_assignments,
            "user role updated"
        );

        Ok(target.with_role(role))
    }

    /// Returns recent audit entries. Only full administrators may read them.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.access_service
            .require_role(actor, &[AdminRole::FullAdmin])
            .await?;

        self.audit_log_repository.list_recent_entries(query).await
    }
}
