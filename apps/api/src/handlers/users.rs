use axum::Json;
use axum::extract::{Extension, Path, State};
use tierscope_core::UserIdentity;
use tierscope_domain::{AdminRole, UserId};

use crate::dto::{SetUserRoleRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_admin_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let principal = state.user_admin_service.get_user(&user, user_id).await?;

    Ok(Json(UserResponse::from(principal)))
}

pub async fn set_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<SetUserRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let role = AdminRole::parse(payload.role.as_str())?;
    let principal = state
        .user_admin_service
        .set_role(&user, user_id, role)
        .await?;

    Ok(Json(UserResponse::from(principal)))
}
