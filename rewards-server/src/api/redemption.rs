//! Staff-side voucher lookup and redemption

use axum::routing::post;
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{RedeemVoucherRequest, RedemptionPreview, Voucher};

use crate::auth::Identity;
use crate::auth::access::{require_member, resolve_branch};
use crate::services::presentation;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{rid}/vouchers/preview", post(preview))
        .route("/api/restaurants/{rid}/vouchers/redeem", post(redeem))
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub code: String,
    pub branch_id: Option<i64>,
}

/// POST /api/restaurants/:rid/vouchers/preview
pub async fn preview(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<RedemptionPreview> {
    let membership = require_member(&state, &identity, restaurant_id).await?;
    let branch_id = resolve_branch(&membership, req.branch_id)?;
    let preview = presentation::preview(
        &state.pool,
        restaurant_id,
        &req.code,
        branch_id,
        state.presentation_ttl_millis,
    )
    .await?;
    Ok(Json(preview))
}

/// POST /api/restaurants/:rid/vouchers/redeem
pub async fn redeem(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(req): Json<RedeemVoucherRequest>,
) -> ApiResult<Voucher> {
    let membership = require_member(&state, &identity, restaurant_id).await?;
    let branch_id = resolve_branch(&membership, req.branch_id)?;
    let voucher = presentation::redeem(
        &state.pool,
        restaurant_id,
        identity.user_id,
        branch_id,
        &req,
        state.presentation_ttl_millis,
    )
    .await?;
    Ok(Json(voucher))
}
