use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tierscope_core::UserIdentity;
use tierscope_domain::{AdminRole, Principal, UserId};
use tierscope_infrastructure::{
    InMemoryAccessScopeCache, InMemoryActivityRepository, InMemoryDirectoryRepository,
};

use crate::api_config::ApiConfig;
use crate::api_services::{RepositorySet, build_app_state};
use crate::state::AppState;

pub(crate) const BOOTSTRAP_TOKEN: &str = "test-bootstrap-token";

/// Application state over in-memory adapters and a lazy, never-connected pool.
pub(crate) struct TestApp {
    pub(crate) state: AppState,
    pub(crate) directory: Arc<InMemoryDirectoryRepository>,
    pub(crate) activity: Arc<InMemoryActivityRepository>,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        let directory = Arc::new(InMemoryDirectoryRepository::new());
        let activity = Arc::new(InMemoryActivityRepository::new());
        let repositories = RepositorySet {
            directory: directory.clone(),
            hierarchy: directory.clone(),
            balances: activity.clone(),
            presence: activity.clone(),
            audit: activity.clone(),
            audit_log: activity.clone(),
            scope_cache: Arc::new(InMemoryAccessScopeCache::new()),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/tierscope")
            .unwrap_or_else(|_| unreachable!());

        Self {
            state: build_app_state(pool, repositories, &test_config()),
            directory,
            activity,
        }
    }

    /// Registers a user with the given role and returns its session identity.
    pub(crate) async fn user(&self, name: &str, role: AdminRole) -> (Principal, UserIdentity) {
        let principal = Principal::new(
            UserId::new(),
            name,
            Some(format!("{}@example.com", name.to_lowercase())),
            role.flags(),
        );
        self.directory.upsert_user(principal.clone()).await;

        let identity = UserIdentity::new(
            principal.id().to_string(),
            principal.display_name(),
            principal.email().map(ToOwned::to_owned),
        );
        (principal, identity)
    }
}

pub(crate) fn test_config() -> ApiConfig {
    ApiConfig {
        migrate_only: false,
        seed_only: false,
        database_url: "postgres://localhost/tierscope".to_owned(),
        database_max_connections: 1,
        frontend_url: "http://localhost:3000".to_owned(),
        bootstrap_token: BOOTSTRAP_TOKEN.to_owned(),
        _session_secret: "x".repeat(32),
        api_host: "127.0.0.1".to_owned(),
        api_port: 3001,
        cookie_secure: false,
        access_scope_cache_ttl_seconds: 30,
        presence_online_window_seconds: 120,
    }
}
