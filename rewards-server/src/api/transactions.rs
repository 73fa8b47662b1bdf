//! Spend capture at the till

use axum::routing::post;
use axum::{Extension, Json, Router, extract::State};
use shared::models::{AccrualResult, TransactionCreate};

use crate::auth::Identity;
use crate::auth::access::{require_member, resolve_branch};
use crate::services::accrual;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/transactions", post(capture))
}

/// POST /api/transactions
pub async fn capture(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(mut req): Json<TransactionCreate>,
) -> ApiResult<AccrualResult> {
    let membership = require_member(&state, &identity, req.restaurant_id).await?;
    req.branch_id = resolve_branch(&membership, req.branch_id)?;
    let result = accrual::capture(&state.pool, identity.user_id, &req).await?;
    Ok(Json(result))
}
