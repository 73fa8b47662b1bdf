//! Diner self-service: balances, vouchers, presentation codes, invitations

use axum::routing::{delete, get, post};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{
    AccountDeletionRequest, InvitationAccept, InvitationAccepted, PointsBalanceDetail,
    PresentedVoucher, RedeemCreditRequest, Transaction, UserType, Voucher,
};

use crate::auth::Identity;
use crate::auth::access::require_self_diner;
use crate::services::{accounts, accrual, engagement, issuer, presentation};
use crate::state::AppState;

use super::{ApiResult, PageQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/diners/{id}/balances", get(balances))
        .route("/api/diners/{id}/vouchers", get(vouchers))
        .route(
            "/api/diners/{id}/restaurants/{rid}/transactions",
            get(transactions),
        )
        .route(
            "/api/diners/{id}/restaurants/{rid}/redeem-credit",
            post(redeem_credit),
        )
        .route("/api/diners/{id}/vouchers/{vid}/select", post(select_voucher))
        .route("/api/diners/{id}/active-voucher", delete(clear_active_voucher))
        .route("/api/diners/{id}/deletion-request", post(request_deletion))
        .route("/api/invitations/accept", post(accept_invitation))
}

/// GET /api/diners/:id/balances
pub async fn balances(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(diner_id): Path<i64>,
) -> ApiResult<Vec<PointsBalanceDetail>> {
    require_self_diner(&identity, diner_id)?;
    Ok(Json(accounts::balances(&state.pool, diner_id).await?))
}

/// GET /api/diners/:id/vouchers
pub async fn vouchers(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(diner_id): Path<i64>,
) -> ApiResult<Vec<Voucher>> {
    require_self_diner(&identity, diner_id)?;
    Ok(Json(accounts::vouchers(&state.pool, diner_id).await?))
}

/// GET /api/diners/:id/restaurants/:rid/transactions
pub async fn transactions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((diner_id, restaurant_id)): Path<(i64, i64)>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Transaction>> {
    require_self_diner(&identity, diner_id)?;
    let (limit, offset) = page.page();
    let history = accrual::history(&state.pool, diner_id, restaurant_id, limit, offset).await?;
    Ok(Json(history))
}

/// POST /api/diners/:id/restaurants/:rid/redeem-credit
pub async fn redeem_credit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((diner_id, restaurant_id)): Path<(i64, i64)>,
    Json(req): Json<RedeemCreditRequest>,
) -> ApiResult<Voucher> {
    require_self_diner(&identity, diner_id)?;
    let voucher = issuer::redeem_credit(&state.pool, diner_id, restaurant_id, &req).await?;
    Ok(Json(voucher))
}

/// POST /api/diners/:id/vouchers/:vid/select
pub async fn select_voucher(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((diner_id, voucher_id)): Path<(i64, i64)>,
) -> ApiResult<PresentedVoucher> {
    require_self_diner(&identity, diner_id)?;
    let presented =
        presentation::select(&state.pool, diner_id, voucher_id, state.presentation_ttl_millis)
            .await?;
    Ok(Json(presented))
}

/// DELETE /api/diners/:id/active-voucher
pub async fn clear_active_voucher(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(diner_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    require_self_diner(&identity, diner_id)?;
    presentation::clear(&state.pool, diner_id).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeletionRequestBody {
    pub reason: Option<String>,
}

/// POST /api/diners/:id/deletion-request
pub async fn request_deletion(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(diner_id): Path<i64>,
    Json(body): Json<DeletionRequestBody>,
) -> ApiResult<AccountDeletionRequest> {
    require_self_diner(&identity, diner_id)?;
    Ok(Json(accounts::request_deletion(&state.pool, diner_id, body.reason).await?))
}

/// POST /api/invitations/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<InvitationAccept>,
) -> ApiResult<InvitationAccepted> {
    if identity.user_type != UserType::Diner {
        return Err(AppError::permission_denied("Only diners can accept invitations"));
    }
    let accepted = engagement::accept_invitation(
        &state.pool,
        state.notifier.as_ref(),
        identity.user_id,
        &req.token,
    )
    .await?;
    Ok(Json(accepted))
}
