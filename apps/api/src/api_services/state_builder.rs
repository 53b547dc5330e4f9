use std::sync::Arc;

use sqlx::PgPool;
use tierscope_application::{
    AccessScopeCache, AccessService, AuditLogRepository, AuditRepository, BalanceRepository,
    BalanceService, DirectoryRepository, HierarchyRepository, HierarchyService, PresenceRepository,
    PresenceService, UserAdminService,
};
use tierscope_infrastructure::{
    InMemoryAccessScopeCache, PostgresAuditRepository, PostgresBalanceRepository,
    PostgresDirectoryRepository, PostgresPresenceRepository,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Port implementations wired into the services.
pub struct RepositorySet {
    pub directory: Arc<dyn DirectoryRepository>,
    pub hierarchy: Arc<dyn HierarchyRepository>,
    pub balances: Arc<dyn BalanceRepository>,
    pub presence: Arc<dyn PresenceRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
    pub scope_cache: Arc<dyn AccessScopeCache>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        let directory = Arc::new(PostgresDirectoryRepository::new(pool.clone()));
        let audit = Arc::new(PostgresAuditRepository::new(pool.clone()));

        Self {
            directory: directory.clone(),
            hierarchy: directory,
            balances: Arc::new(PostgresBalanceRepository::new(pool.clone())),
            presence: Arc::new(PostgresPresenceRepository::new(pool.clone())),
            audit: audit.clone(),
            audit_log: audit,
            scope_cache: Arc::new(InMemoryAccessScopeCache::new()),
        }
    }
}

pub fn build_app_state(
    pool: PgPool,
    repositories: RepositorySet,
    config: &ApiConfig,
) -> AppState {
    let access_service = AccessService::new(
        repositories.directory.clone(),
        repositories.scope_cache,
        config.access_scope_cache_ttl_seconds,
    );

    AppState {
        hierarchy_service: HierarchyService::new(
            access_service.clone(),
            repositories.directory.clone(),
            repositories.hierarchy.clone(),
            repositories.audit.clone(),
        ),
        user_admin_service: UserAdminService::new(
            access_service.clone(),
            repositories.directory,
            repositories.hierarchy,
            repositories.audit.clone(),
            repositories.audit_log,
        ),
        balance_service: BalanceService::new(
            access_service.clone(),
            repositories.balances,
            repositories.audit.clone(),
        ),
        presence_service: PresenceService::new(
            access_service.clone(),
            repositories.presence,
            config.presence_online_window_seconds,
        ),
        access_service,
        audit_repository: repositories.audit,
        postgres_pool: pool,
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    }
}
