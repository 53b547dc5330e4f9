use std::sync::Arc;

use sqlx::PgPool;
use tierscope_application::{
    AccessService, AuditRepository, BalanceService, HierarchyService, PresenceService,
    UserAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub hierarchy_service: HierarchyService,
    pub user_admin_service: UserAdminService,
    pub balance_service: BalanceService,
    pub presence_service: PresenceService,
    pub audit_repository: Arc<dyn AuditRepository>,
    pub postgres_pool: PgPool,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
