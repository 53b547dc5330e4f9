use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tierscope_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{AccessScopeResponse, MeResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<MeResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let principal = state.access_service.current_principal(&identity).await?;
    let scope = state
        .access_service
        .scope_for_principal(&principal)
        .await?;

    Ok(Json(MeResponse {
        user_id: principal.id().to_string(),
        display_name: principal.display_name().to_owned(),
        email: principal.email().map(ToOwned::to_owned),
        role: principal.role().as_str().to_owned(),
        scope: AccessScopeResponse::from(scope),
    }))
}
