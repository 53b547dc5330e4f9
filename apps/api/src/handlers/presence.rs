use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, State};
use tierscope_core::UserIdentity;
use tierscope_domain::PresenceStatus;

use crate::dto::{HeartbeatRequest, PresenceResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_presence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PresenceResponse>>> {
    let entries = state
        .presence_service
        .list_presence(&user)
        .await?
        .into_iter()
        .map(PresenceResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn heartbeat_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<HeartbeatRequest>,
) -> ApiResult<Json<PresenceResponse>> {
    let status = PresenceStatus::from_str(payload.status.as_str())?;
    let record = state.presence_service.heartbeat(&user, status).await?;

    Ok(Json(PresenceResponse::from(record)))
}
