//! Reconciliation uploads and reports

use axum::routing::{get, post};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
};
use shared::models::{ReconciliationBatch, ReconciliationBatchDetail, ReconciliationUpload, Voucher};

use crate::auth::Identity;
use crate::auth::access::require_manager;
use crate::services::reconciliation;
use crate::state::AppState;

use super::{ApiResult, PageQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{rid}/reconciliation", get(list_batches))
        .route("/api/restaurants/{rid}/reconciliation/upload", post(upload))
        .route(
            "/api/restaurants/{rid}/reconciliation/unreconciled",
            get(unreconciled),
        )
        .route("/api/restaurants/{rid}/reconciliation/{bid}", get(batch_detail))
}

/// POST /api/restaurants/:rid/reconciliation/upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<ReconciliationUpload>,
) -> ApiResult<ReconciliationBatchDetail> {
    require_manager(&state, &identity, restaurant_id).await?;
    let detail =
        reconciliation::upload(&state.pool, restaurant_id, identity.user_id, &payload).await?;
    Ok(Json(detail))
}

/// GET /api/restaurants/:rid/reconciliation
pub async fn list_batches(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<ReconciliationBatch>> {
    require_manager(&state, &identity, restaurant_id).await?;
    let (limit, offset) = page.page();
    Ok(Json(reconciliation::list(&state.pool, restaurant_id, limit, offset).await?))
}

/// GET /api/restaurants/:rid/reconciliation/:bid
pub async fn batch_detail(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, batch_id)): Path<(i64, i64)>,
) -> ApiResult<ReconciliationBatchDetail> {
    require_manager(&state, &identity, restaurant_id).await?;
    Ok(Json(reconciliation::detail(&state.pool, restaurant_id, batch_id).await?))
}

/// GET /api/restaurants/:rid/reconciliation/unreconciled
pub async fn unreconciled(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Voucher>> {
    require_manager(&state, &identity, restaurant_id).await?;
    let (limit, offset) = page.page();
    Ok(Json(
        reconciliation::unreconciled(&state.pool, restaurant_id, limit, offset).await?,
    ))
}
