use std::sync::Arc;

use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{
    AccessScope, AdminRole, AssignmentEdge, AuditAction, Principal, UserAssignment, UserId,
};
use tracing::info;

use crate::{
    AccessService, AuditEvent, AuditRepository, DirectoryRepository, HierarchyRepository,
    NewAssignment, append_committed_event,
};

/// Application service that creates and removes assignment edges.
#[derive(Clone)]
pub struct HierarchyService {
    access_service: AccessService,
    directory: Arc<dyn DirectoryRepository>,
    repository: Arc<dyn HierarchyRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl HierarchyService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        directory: Arc<dyn DirectoryRepository>,
        repository: Arc<dyn HierarchyRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            directory,
            repository,
            audit_repository,
        }
    }

    /// Lists the assignments visible to the acting principal.
    pub async fn list_assignments(&self, actor: &UserIdentity) -> AppResult<Vec<UserAssignment>> {
        let principal = self.access_service.current_principal(actor).await?;
        let scope = self.access_service.scope_for_principal(&principal).await?;

        match scope.id_filter() {
            None => self.repository.list_assignments(None).await,
            Some(_) if scope.is_denied() => Err(AppError::Forbidden(
                "assignments are only visible to administrators".to_owned(),
            )),
            Some(manager_ids) => self.repository.list_assignments(Some(manager_ids.as_slice())).await,
        }
    }

    /// Creates an assignment edge and emits an audit event.
    pub async fn assign(
        &self,
        actor: &UserIdentity,
        manager_id: UserId,
        user_id: UserId,
    ) -> AppResult<UserAssignment> {
        let principal = self.access_service.current_principal(actor).await?;
        ensure_may_edit_hierarchy(&principal)?;

        if manager_id == user_id {
            return Err(AppError::Validation(
                "a user cannot be assigned to itself".to_owned(),
            ));
        }

        let (manager, target) = self.load_endpoints(manager_id, user_id).await?;
        let edge = AssignmentEdge::classify(&manager, &target).ok_or_else(|| {
            AppError::Validation(format!(
                "cannot assign a '{}' to a '{}'",
                target.role().as_str(),
                manager.role().as_str()
            ))
        })?;
        self.authorize_edge(&principal, &manager, Some(edge)).await?;

        let assignment = self
            .repository
            .create_assignment(NewAssignment {
                manager_id,
                assigned_user_id: user_id,
                assigned_by: principal.id(),
            })
            .await?;

        self.access_service.invalidate_all().await?;
        append_committed_event(
            self.audit_repository.as_ref(),
            AuditEvent {
                subject: principal.id().to_string(),
                action: AuditAction::HierarchyAssignmentCreated,
                resource_type: "user_assignment".to_owned(),
                resource_id: format!("{manager_id}:{user_id}"),
                detail: Some(format!(
                    "assigned '{}' to '{}' ({})",
                    target.display_name(),
                    manager.display_name(),
                    edge.as_str()
                )),
            },
        )
        .await;

        info!(
            actor_id = %principal.id(),
            manager_id = %manager_id,
            user_id = %user_id,
            edge = edge.as_str(),
            "assignment created"
        );

        Ok(assignment)
    }

    /// Removes an assignment edge and emits an audit event.
    pub async fn unassign(
        &self,
        actor: &UserIdentity,
        manager_id: UserId,
        user_id: UserId,
    ) -> AppResult<()> {
        let principal = self.access_service.current_principal(actor).await?;
        ensure_may_edit_hierarchy(&principal)?;

        let (manager, target) = self.load_endpoints(manager_id, user_id).await?;
        let edge = AssignmentEdge::classify(&manager, &target);
        self.authorize_edge(&principal, &manager, edge).await?;

        if !self.repository.delete_assignment(manager_id, user_id).await? {
            return Err(AppError::NotFound(format!(
                "assignment '{manager_id}' -> '{user_id}' was not found"
            )));
        }

        self.access_service.invalidate_all().await?;
        append_committed_event(
            self.audit_repository.as_ref(),
            AuditEvent {
                subject: principal.id().to_string(),
                action: AuditAction::HierarchyAssignmentRemoved,
                resource_type: "user_assignment".to_owned(),
                resource_id: format!("{manager_id}:{user_id}"),
                detail: Some(format!(
                    "removed '{}' from '{}'",
                    target.display_name(),
                    manager.display_name()
                )),
            },
        )
        .await;

        info!(
            actor_id = %principal.id(),
            manager_id = %manager_id,
            user_id = %user_id,
            "assignment removed"
        );

        Ok(())
    }

    async fn load_endpoints(
        &self,
        manager_id: UserId,
        user_id: UserId,
    ) -> AppResult<(Principal, Principal)> {
        let manager = self
            .directory
            .find_principal(manager_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{manager_id}' was not found")))?;
        let target = self
            .directory
            .find_principal(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        Ok((manager, target))
    }

    /// Full administrators may edit any edge. Superior managers may only edit
    /// manager-to-user edges of managers inside their own scope.
    async fn authorize_edge(
        &self,
        principal: &Principal,
        manager: &Principal,
        edge: Option<AssignmentEdge>,
    ) -> AppResult<()> {
        match principal.role() {
            AdminRole::FullAdmin => Ok(()),
            AdminRole::SuperiorManager if edge == Some(AssignmentEdge::ManagerToUser) => {
                let scope = self.access_service.scope_for_principal(principal).await?;
                if manager_in_scope(&scope, manager) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(format!(
                        "manager '{}' is not assigned to you",
                        manager.id()
                    )))
                }
            }
            _ => Err(AppError::Forbidden(
                "you may not change this assignment".to_owned(),
            )),
        }
    }
}

fn ensure_may_edit_hierarchy(principal: &Principal) -> AppResult<()> {
    match principal.role() {
        AdminRole::FullAdmin | AdminRole::SuperiorManager => Ok(()),
        role => Err(AppError::Forbidden(format!(
            "role '{}' may not edit the user hierarchy",
            role.as_str()
        ))),
    }
}

fn manager_in_scope(scope: &AccessScope, manager: &Principal) -> bool {
    !scope.is_degraded() && scope.allows(manager.id())
}
