//! Invitations and campaigns

use axum::routing::{get, post};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
};
use shared::models::{Campaign, CampaignCreate, DinerInvitation, InvitationCreate};

use crate::auth::Identity;
use crate::auth::access::{require_manager, require_member};
use crate::services::engagement;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurants/{rid}/invitations",
            get(list_invitations).post(invite),
        )
        .route(
            "/api/restaurants/{rid}/campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .route(
            "/api/restaurants/{rid}/campaigns/{cid}/send",
            post(send_campaign),
        )
}

/// GET /api/restaurants/:rid/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Vec<DinerInvitation>> {
    require_member(&state, &identity, restaurant_id).await?;
    Ok(Json(engagement::list_invitations(&state.pool, restaurant_id).await?))
}

/// POST /api/restaurants/:rid/invitations
pub async fn invite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<InvitationCreate>,
) -> ApiResult<DinerInvitation> {
    require_member(&state, &identity, restaurant_id).await?;
    let invitation = engagement::invite(
        &state.pool,
        state.notifier.as_ref(),
        restaurant_id,
        identity.user_id,
        state.invitation_ttl_millis,
        &payload,
    )
    .await?;
    Ok(Json(invitation))
}

/// GET /api/restaurants/:rid/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Vec<Campaign>> {
    require_manager(&state, &identity, restaurant_id).await?;
    Ok(Json(engagement::list_campaigns(&state.pool, restaurant_id).await?))
}

/// POST /api/restaurants/:rid/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CampaignCreate>,
) -> ApiResult<Campaign> {
    require_manager(&state, &identity, restaurant_id).await?;
    let campaign =
        engagement::create_campaign(&state.pool, restaurant_id, identity.user_id, &payload)
            .await?;
    Ok(Json(campaign))
}

/// POST /api/restaurants/:rid/campaigns/:cid/send
pub async fn send_campaign(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((restaurant_id, campaign_id)): Path<(i64, i64)>,
) -> ApiResult<Campaign> {
    require_manager(&state, &identity, restaurant_id).await?;
    let campaign = engagement::send_campaign(
        &state.pool,
        state.notifier.as_ref(),
        restaurant_id,
        campaign_id,
        identity.user_id,
    )
    .await?;
    Ok(Json(campaign))
}
