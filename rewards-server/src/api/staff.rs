//! Portal staff endpoints

use axum::routing::{get, put};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
};
use shared::models::{PortalUser, PortalUserCreate, PortalUserDetail, PortalUserUpdate};

use crate::auth::Identity;
use crate::auth::access::require_manager;
use crate::services::staff;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{rid}/staff", get(list).post(add))
        .route(
            "/api/restaurants/{rid}/staff/{pid}",
            put(update).delete(deactivate),
        )
}

/// GET /api/restaurants/:rid/staff
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Vec<PortalUserDetail>> {
    require_manager(&state, &identity, restaurant_id).await?;
    Ok(Json(staff::list(&state.pool, restaurant_id).await?))
}

/// POST /api/restaurants/:rid/staff
pub async fn add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<PortalUserCreate>,
) -> ApiResult<PortalUser> {
    require_manager(&state, &identity, restaurant_id).await?;
    Ok(Json(staff::add(&state.pool, restaurant_id, identity.user_id, &payload).await?))
}

/// PUT /api/restaurants/:rid/staff/:pid
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, portal_user_id)): Path<(i64, i64)>,
    Json(payload): Json<PortalUserUpdate>,
) -> ApiResult<PortalUser> {
    require_manager(&state, &identity, restaurant_id).await?;
    let membership = staff::update(
        &state.pool,
        restaurant_id,
        portal_user_id,
        identity.user_id,
        &payload,
    )
    .await?;
    Ok(Json(membership))
}

/// DELETE /api/restaurants/:rid/staff/:pid (deactivates)
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, portal_user_id)): Path<(i64, i64)>,
) -> ApiResult<PortalUser> {
    require_manager(&state, &identity, restaurant_id).await?;
    let membership =
        staff::deactivate(&state.pool, restaurant_id, portal_user_id, identity.user_id).await?;
    Ok(Json(membership))
}
