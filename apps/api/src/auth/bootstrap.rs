use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tierscope_application::AuditEvent;
use tierscope_core::{AppError, UserIdentity};
use tierscope_domain::{AuditAction, UserId};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::SessionBootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

/// Starts a session for a registered principal presenting the bootstrap token.
pub async fn session_bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SessionBootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        warn!("session bootstrap rejected: invalid token");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user_id = UserId::parse(payload.user_id.as_str())?;
    let principal = state.access_service.registered_principal(user_id).await?;
    let identity = UserIdentity::new(
        principal.id().to_string(),
        principal.display_name(),
        principal.email().map(ToOwned::to_owned),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    state
        .audit_repository
        .append_event(AuditEvent {
            subject: principal.id().to_string(),
            action: AuditAction::SessionStarted,
            resource_type: "session".to_owned(),
            resource_id: principal.id().to_string(),
            detail: Some(format!("role '{}'", principal.role().as_str())),
        })
        .await?;

    info!(user_id = %principal.id(), role = principal.role().as_str(), "session started");
    Ok(StatusCode::NO_CONTENT)
}
