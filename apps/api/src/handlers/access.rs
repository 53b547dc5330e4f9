use axum::Json;
use axum::extract::{Extension, Query, State};
use serde::Deserialize;
use tierscope_core::UserIdentity;

use crate::dto::AccessScopeResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AccessScopeQuery {
    pub refresh: Option<bool>,
}

pub async fn access_scope_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AccessScopeQuery>,
) -> ApiResult<Json<AccessScopeResponse>> {
    let scope = if query.refresh.unwrap_or(false) {
        state.access_service.refresh_scope(&user).await?
    } else {
        state.access_service.scope_for(&user).await?
    };

    Ok(Json(AccessScopeResponse::from(scope)))
}
