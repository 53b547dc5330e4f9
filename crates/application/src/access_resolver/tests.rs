use std::sync::Arc;
use std::sync::atomic::Ordering;

use tierscope_domain::{AccessScope, AdminRole, RoleFlags};

use crate::test_support::FakeDirectory;

use super::AccessResolver;

fn resolver(directory: &Arc<FakeDirectory>) -> AccessResolver {
    AccessResolver::new(directory.clone())
}

#[tokio::test]
async fn full_admin_is_unrestricted_without_queries() {
    let directory = Arc::new(FakeDirectory::default());
    let admin = directory.add_role("U1", AdminRole::FullAdmin).await;
    let user = directory.add_user("someone", RoleFlags::default()).await;
    directory.link(&admin, &user).await;

    let scope = resolver(&directory).resolve(&admin).await;

    assert_eq!(scope, AccessScope::Unrestricted);
    assert!(scope.legacy_ids().is_empty());
    assert_eq!(directory.assignment_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn principal_without_role_is_denied() {
    let directory = Arc::new(FakeDirectory::default());
    let nobody = directory.add_user("nobody", RoleFlags::default()).await;

    let scope = resolver(&directory).resolve(&nobody).await;

    assert_eq!(scope, AccessScope::Denied);
    assert!(!scope.allows(nobody.id()));
}

#[tokio::test]
async fn manager_without_assignments_sees_only_self() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;

    let scope = resolver(&directory).resolve(&manager).await;

    assert_eq!(scope, AccessScope::only_self(manager.id()));
}

#[tokio::test]
async fn manager_sees_assigned_end_user() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory
        .add_user("U2", RoleFlags::new(false, true, false))
        .await;
    let user = directory.add_user("U3", RoleFlags::default()).await;
    directory.link(&manager, &user).await;

    let scope = resolver(&directory).resolve(&manager).await;

    assert_eq!(
        scope,
        AccessScope::restricted(manager.id(), [user.id()])
    );
}

#[tokio::test]
async fn manager_assignments_pointing_at_managers_are_excluded() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let peer = directory.add_role("peer", AdminRole::Manager).await;
    let admin = directory.add_role("admin", AdminRole::FullAdmin).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    directory.link(&manager, &peer).await;
    directory.link(&manager, &admin).await;
    directory.link(&manager, &user).await;

    let scope = resolver(&directory).resolve(&manager).await;

    assert!(scope.allows(user.id()));
    assert!(!scope.allows(peer.id()));
    assert!(!scope.allows(admin.id()));
}

#[tokio::test]
async fn superior_manager_whose_managers_have_no_users() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let first = directory.add_role("first", AdminRole::Manager).await;
    let second = directory.add_role("second", AdminRole::Manager).await;
    directory.link(&superior, &first).await;
    directory.link(&superior, &second).await;

    let scope = resolver(&directory).resolve(&superior).await;

    assert_eq!(
        scope,
        AccessScope::restricted(superior.id(), [first.id(), second.id()])
    );
}

#[tokio::test]
async fn superior_manager_reaches_users_of_verified_managers() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    let stray_admin = directory.add_role("stray", AdminRole::FullAdmin).await;
    directory.link(&superior, &manager).await;
    directory.link(&manager, &user).await;
    directory.link(&manager, &stray_admin).await;

    let scope = resolver(&directory).resolve(&superior).await;

    assert_eq!(
        scope,
        AccessScope::restricted(superior.id(), [manager.id(), user.id()])
    );
}

#[tokio::test]
async fn second_superior_manager_is_not_a_verified_manager() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let other_superior = directory
        .add_role("other", AdminRole::SuperiorManager)
        .await;
    let hidden_user = directory.add_user("hidden", RoleFlags::default()).await;
    directory.link(&superior, &other_superior).await;
    directory.link(&other_superior, &hidden_user).await;

    let scope = resolver(&directory).resolve(&superior).await;

    assert_eq!(scope, AccessScope::only_self(superior.id()));
    assert!(!scope.allows(other_superior.id()));
    assert!(!scope.allows(hidden_user.id()));
}

#[tokio::test]
async fn superior_manager_does_not_reach_users_assigned_directly() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    directory.link(&superior, &user).await;

    let scope = resolver(&directory).resolve(&superior).await;

    assert_eq!(scope, AccessScope::only_self(superior.id()));
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let first = directory.add_user("first", RoleFlags::default()).await;
    let second = directory.add_user("second", RoleFlags::default()).await;
    directory.link(&superior, &manager).await;
    directory.link(&manager, &first).await;
    directory.link(&manager, &second).await;

    let resolver = resolver(&directory);
    let first_scope = resolver.resolve(&superior).await;
    let second_scope = resolver.resolve(&superior).await;

    assert_eq!(first_scope, second_scope);
}

#[tokio::test]
async fn assignment_lookup_failure_degrades_to_principal() {
    let directory = Arc::new(FakeDirectory::default());
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    let user = directory.add_user("user", RoleFlags::default()).await;
    directory.link(&manager, &user).await;
    directory
        .fail_assignment_lookup
        .store(true, Ordering::SeqCst);

    let scope = resolver(&directory).resolve(&manager).await;

    assert!(scope.is_degraded());
    assert!(scope.allows(manager.id()));
    assert!(!scope.allows(user.id()));
}

#[tokio::test]
async fn verification_failure_never_widens_superior_scope() {
    let directory = Arc::new(FakeDirectory::default());
    let superior = directory
        .add_role("superior", AdminRole::SuperiorManager)
        .await;
    let manager = directory.add_role("manager", AdminRole::Manager).await;
    directory.link(&superior, &manager).await;
    directory.fail_principal_lookup.store(true, Ordering::SeqCst);

    let scope = resolver(&directory).resolve(&superior).await;

    assert!(scope.is_degraded());
    assert!(!scope.allows(manager.id()));
    assert_eq!(scope.legacy_ids(), vec![superior.id()]);
}
