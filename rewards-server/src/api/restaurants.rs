//! Restaurant administration: configuration, branches, voucher types and
//! read models for the portal

use axum::routing::{get, post, put};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    ActivityLog, Branch, BranchCreate, BranchUpdate, DinerBalanceRow, Restaurant,
    RestaurantUpdate, Voucher, VoucherType, VoucherTypeCreate, VoucherTypeUpdate,
};

use crate::auth::Identity;
use crate::auth::access::{require_manager, require_member};
use crate::services::restaurants;
use crate::state::AppState;

use super::{ApiResult, PageQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{rid}", get(get_restaurant).put(update_restaurant))
        .route(
            "/api/restaurants/{rid}/branches",
            get(list_branches).post(create_branch),
        )
        .route("/api/restaurants/{rid}/branches/{bid}", put(update_branch))
        .route(
            "/api/restaurants/{rid}/branches/{bid}/default",
            post(set_default_branch),
        )
        .route(
            "/api/restaurants/{rid}/voucher-types",
            get(list_voucher_types).post(create_voucher_type),
        )
        .route(
            "/api/restaurants/{rid}/voucher-types/{tid}",
            put(update_voucher_type).delete(deactivate_voucher_type),
        )
        .route("/api/restaurants/{rid}/vouchers", get(list_vouchers))
        .route("/api/restaurants/{rid}/diners", get(list_diners))
        .route("/api/restaurants/{rid}/activity", get(activity))
}

// ── Configuration ──

/// GET /api/restaurants/:rid
pub async fn get_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Restaurant> {
    require_member(&state, &identity, restaurant_id).await?;
    Ok(Json(restaurants::get(&state.pool, restaurant_id).await?))
}

/// PUT /api/restaurants/:rid
pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    require_manager(&state, &identity, restaurant_id).await?;
    let restaurant =
        restaurants::update(&state.pool, restaurant_id, identity.user_id, payload).await?;
    Ok(Json(restaurant))
}

// ── Branches ──

/// GET /api/restaurants/:rid/branches
pub async fn list_branches(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Vec<Branch>> {
    require_member(&state, &identity, restaurant_id).await?;
    Ok(Json(restaurants::list_branches(&state.pool, restaurant_id).await?))
}

/// POST /api/restaurants/:rid/branches
pub async fn create_branch(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<BranchCreate>,
) -> ApiResult<Branch> {
    require_manager(&state, &identity, restaurant_id).await?;
    let branch =
        restaurants::create_branch(&state.pool, restaurant_id, identity.user_id, &payload).await?;
    Ok(Json(branch))
}

/// PUT /api/restaurants/:rid/branches/:bid
pub async fn update_branch(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, branch_id)): Path<(i64, i64)>,
    Json(payload): Json<BranchUpdate>,
) -> ApiResult<Branch> {
    require_manager(&state, &identity, restaurant_id).await?;
    let branch = restaurants::update_branch(
        &state.pool,
        restaurant_id,
        branch_id,
        identity.user_id,
        &payload,
    )
    .await?;
    Ok(Json(branch))
}

/// POST /api/restaurants/:rid/branches/:bid/default
pub async fn set_default_branch(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, branch_id)): Path<(i64, i64)>,
) -> ApiResult<Branch> {
    require_manager(&state, &identity, restaurant_id).await?;
    let branch =
        restaurants::set_default_branch(&state.pool, restaurant_id, branch_id, identity.user_id)
            .await?;
    Ok(Json(branch))
}

// ── Voucher types ──

/// GET /api/restaurants/:rid/voucher-types
///
/// Open to any signed-in user: diners browse it to pick what to spend
/// credits on.
pub async fn list_voucher_types(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Vec<VoucherType>> {
    Ok(Json(restaurants::list_voucher_types(&state.pool, restaurant_id).await?))
}

/// POST /api/restaurants/:rid/voucher-types
pub async fn create_voucher_type(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<VoucherTypeCreate>,
) -> ApiResult<VoucherType> {
    require_manager(&state, &identity, restaurant_id).await?;
    let vt = restaurants::create_voucher_type(&state.pool, restaurant_id, identity.user_id, payload)
        .await?;
    Ok(Json(vt))
}

/// PUT /api/restaurants/:rid/voucher-types/:tid
pub async fn update_voucher_type(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, voucher_type_id)): Path<(i64, i64)>,
    Json(payload): Json<VoucherTypeUpdate>,
) -> ApiResult<VoucherType> {
    require_manager(&state, &identity, restaurant_id).await?;
    let vt = restaurants::update_voucher_type(
        &state.pool,
        restaurant_id,
        voucher_type_id,
        identity.user_id,
        payload,
    )
    .await?;
    Ok(Json(vt))
}

/// DELETE /api/restaurants/:rid/voucher-types/:tid (deactivates)
pub async fn deactivate_voucher_type(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, voucher_type_id)): Path<(i64, i64)>,
) -> ApiResult<VoucherType> {
    require_manager(&state, &identity, restaurant_id).await?;
    let vt = restaurants::deactivate_voucher_type(
        &state.pool,
        restaurant_id,
        voucher_type_id,
        identity.user_id,
    )
    .await?;
    Ok(Json(vt))
}

// ── Read models ──

#[derive(Debug, Default, Deserialize)]
pub struct VoucherListQuery {
    pub redeemed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/restaurants/:rid/vouchers
pub async fn list_vouchers(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<VoucherListQuery>,
) -> ApiResult<Vec<Voucher>> {
    require_member(&state, &identity, restaurant_id).await?;
    let (limit, offset) = crate::db::page(query.limit, query.offset);
    let vouchers =
        restaurants::list_vouchers(&state.pool, restaurant_id, query.redeemed, limit, offset)
            .await?;
    Ok(Json(vouchers))
}

#[derive(Debug, Default, Deserialize)]
pub struct DinerListQuery {
    pub branch_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/restaurants/:rid/diners
pub async fn list_diners(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<DinerListQuery>,
) -> ApiResult<Vec<DinerBalanceRow>> {
    require_member(&state, &identity, restaurant_id).await?;
    let (limit, offset) = crate::db::page(query.limit, query.offset);
    let diners =
        restaurants::list_diners(&state.pool, restaurant_id, query.branch_id, limit, offset)
            .await?;
    Ok(Json(diners))
}

/// GET /api/restaurants/:rid/activity
pub async fn activity(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<ActivityLog>> {
    require_manager(&state, &identity, restaurant_id).await?;
    let (limit, offset) = page.page();
    Ok(Json(restaurants::activity(&state.pool, restaurant_id, limit, offset).await?))
}
