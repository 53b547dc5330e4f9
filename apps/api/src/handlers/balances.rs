use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use tierscope_application::AdjustBalanceInput;
use tierscope_core::UserIdentity;
use tierscope_domain::{BalanceDelta, Currency, UserId};

use crate::dto::{AdjustBalanceRequest, BalanceResponse, BalanceTransferResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TransferQuery {
    pub limit: Option<usize>,
}

pub async fn list_balances_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<BalanceResponse>>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let balances = state
        .balance_service
        .list_balances(&user, user_id)
        .await?
        .into_iter()
        .map(BalanceResponse::from)
        .collect();

    Ok(Json(balances))
}

pub async fn adjust_balance_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> ApiResult<Json<BalanceTransferResponse>> {
    let input = AdjustBalanceInput {
        user_id: UserId::parse(user_id.as_str())?,
        currency: Currency::from_str(payload.currency.as_str())?,
        delta: BalanceDelta::parse(payload.delta.as_str())?,
        note: payload.note,
    };
    let transfer = state.balance_service.adjust_balance(&user, input).await?;

    Ok(Json(BalanceTransferResponse::from(transfer)))
}

pub async fn list_transfers_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Query(query): Query<TransferQuery>,
) -> ApiResult<Json<Vec<BalanceTransferResponse>>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let transfers = state
        .balance_service
        .list_transfers(&user, user_id, query.limit.unwrap_or(50))
        .await?
        .into_iter()
        .map(BalanceTransferResponse::from)
        .collect();

    Ok(Json(transfers))
}
