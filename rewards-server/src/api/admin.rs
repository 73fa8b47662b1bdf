//! Platform operator endpoints

use axum::routing::post;
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
};
use shared::models::AccountDeletionRequest;

use crate::auth::Identity;
use crate::auth::access::require_platform;
use crate::services::accounts;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/admin/deletion-requests/{id}/process",
        post(process_deletion),
    )
}

/// POST /api/admin/deletion-requests/:id/process
pub async fn process_deletion(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(request_id): Path<i64>,
) -> ApiResult<AccountDeletionRequest> {
    require_platform(&identity)?;
    let request = accounts::process_deletion(&state.pool, request_id, identity.user_id).await?;
    Ok(Json(request))
}
