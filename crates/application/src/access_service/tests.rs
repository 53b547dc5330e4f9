use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{AccessScope, AdminRole, Principal, RoleFlags, UserId};

use crate::test_support::{FakeDirectory, FakeScopeCache, identity};
use crate::{DirectoryRepository, HierarchyRepository};

use super::AccessService;

fn service(directory: &Arc<FakeDirectory>) -> AccessService {
    AccessService::new(directory.clone(), Arc::new(FakeScopeCache::default()), 30)
}

#[tokio::test]
async fn unknown_subject_is_unauthorized() {
    let directory = Arc::new(FakeDirectory::default());
    let service = service(&directory);

    let result = service
        .scope_for(&UserIdentity::new("not-a-uuid", "ghost", None))
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let service = service(&directory);
    let actor = identity(&manager);

    let first = service.scope_for(&actor).await;
    let second = service.scope_for(&actor).await;

    assert_eq!(first.ok(), second.ok());
    assert_eq!(directory.assignment_queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidation_exposes_new_assignments() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    let service = service(&directory);
    let actor = identity(&manager);

    let before = service.scope_for(&actor).await;
    assert_eq!(before.ok(), Some(AccessScope::only_self(manager.id())));

    directory.link(&manager, &user).await;
    let stale = service.scope_for(&actor).await;
    assert_eq!(stale.ok(), Some(AccessScope::only_self(manager.id())));

    assert!(service.invalidate_all().await.is_ok());
    let fresh = service.scope_for(&actor).await;
    assert!(fresh.is_ok_and(|scope| scope.allows(user.id())));
}

#[tokio::test]
async fn degraded_scopes_are_not_cached() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    directory.link(&manager, &user).await;
    let service = service(&directory);
    let actor = identity(&manager);

    directory
        .fail_assignment_lookup
        .store(true, Ordering::SeqCst);
    let degraded = service.scope_for(&actor).await;
    assert!(degraded.is_ok_and(|scope| scope.is_degraded()));

    directory
        .fail_assignment_lookup
        .store(false, Ordering::SeqCst);
    let recovered = service.scope_for(&actor).await;
    assert!(recovered.is_ok_and(|scope| scope.allows(user.id())));
}

#[tokio::test]
async fn require_access_reports_plain_denial() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let stranger = directory.add_user("stranger", RoleFlags::default()).await;
    let service = service(&directory);

    let result = service
        .require_access(&identity(&manager), stranger.id())
        .await;

    match result {
        Err(AppError::Forbidden(message)) => {
            assert!(message.contains(stranger.id().to_string().as_str()));
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn require_role_rejects_other_roles() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let service = service(&directory);

    let result = service
        .require_role(&identity(&manager), &[AdminRole::FullAdmin])
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

/// Directory that parks one resolution right after its assignment read.
struct PausingDirectory {
    inner: Arc<FakeDirectory>,
    armed: AtomicBool,
    paused: Notify,
    resume: Notify,
}

#[async_trait]
impl DirectoryRepository for PausingDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        self.inner.find_principal(user_id).await
    }

    async fn list_principals(&self, user_ids: &[UserId]) -> AppResult<Vec<Principal>> {
        self.inner.list_principals(user_ids).await
    }

    async fn list_all_principals(&self) -> AppResult<Vec<Principal>> {
        self.inner.list_all_principals().await
    }

    async fn list_assigned_user_ids(&self, manager_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        let user_ids = self.inner.list_assigned_user_ids(manager_ids).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.paused.notify_one();
            self.resume.notified().await;
        }
        user_ids
    }
}

#[tokio::test]
async fn resolution_racing_invalidation_does_not_repopulate_cache() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    directory.link(&manager, &user).await;
    let pausing = Arc::new(PausingDirectory {
        inner: directory.clone(),
        armed: AtomicBool::new(true),
        paused: Notify::new(),
        resume: Notify::new(),
    });
    let service = AccessService::new(pausing.clone(), Arc::new(FakeScopeCache::default()), 30);
    let actor = identity(&manager);

    let in_flight = tokio::spawn({
        let service = service.clone();
        let actor = actor.clone();
        async move { service.scope_for(&actor).await }
    });
    pausing.paused.notified().await;

    let removed = directory.delete_assignment(manager.id(), user.id()).await;
    assert!(removed.is_ok_and(|removed| removed));
    assert!(service.invalidate_all().await.is_ok());
    pausing.resume.notify_one();
    assert!(in_flight.await.is_ok());

    let next = service.scope_for(&actor).await;
    assert_eq!(next.ok(), Some(AccessScope::only_self(manager.id())));
}
