use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tierscope_core::UserIdentity;
use tierscope_domain::UserId;

use crate::dto::{AssignmentRequest, AssignmentResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .hierarchy_service
        .list_assignments(&user)
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let manager_id = UserId::parse(payload.manager_id.as_str())?;
    let user_id = UserId::parse(payload.user_id.as_str())?;
    let assignment = state
        .hierarchy_service
        .assign(&user, manager_id, user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(assignment))))
}

pub async fn unassign_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AssignmentRequest>,
) -> ApiResult<StatusCode> {
    let manager_id = UserId::parse(payload.manager_id.as_str())?;
    let user_id = UserId::parse(payload.user_id.as_str())?;
    state
        .hierarchy_service
        .unassign(&user, manager_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
