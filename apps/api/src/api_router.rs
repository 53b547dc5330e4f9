mod cors;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use tierscope_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

use self::cors::build_cors_layer;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/access/scope",
            get(handlers::access::access_scope_handler),
        )
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler),
        )
        .route(
            "/api/users/{user_id}/role",
            put(handlers::users::set_user_role_handler),
        )
        .route(
            "/api/users/{user_id}/balances",
            get(handlers::balances::list_balances_handler),
        )
        .route(
            "/api/users/{user_id}/balances/adjustments",
            post(handlers::balances::adjust_balance_handler),
        )
        .route(
            "/api/users/{user_id}/transfers",
            get(handlers::balances::list_transfers_handler),
        )
        .route(
            "/api/hierarchy/assignments",
            get(handlers::hierarchy::list_assignments_handler)
                .post(handlers::hierarchy::assign_handler),
        )
        .route(
            "/api/hierarchy/unassignments",
            post(handlers::hierarchy::unassign_handler),
        )
        .route(
            "/api/presence",
            get(handlers::presence::list_presence_handler),
        )
        .route(
            "/api/presence/heartbeat",
            post(handlers::presence::heartbeat_handler),
        )
        .route(
            "/api/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::session_bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
