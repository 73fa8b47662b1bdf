//! Public authentication endpoints: portal login, diner OTP, password reset

use axum::routing::post;
use axum::{Json, Router, extract::State, middleware};
use serde::Deserialize;

use crate::auth::rate_limit::{login_rate_limit, otp_rate_limit};
use crate::services::accounts::{self, Session};
use crate::state::AppState;

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    let password_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let otp_routes = Router::new()
        .route("/api/auth/otp/request", post(request_otp))
        .route("/api/auth/otp/verify", post(verify_otp))
        .layer(middleware::from_fn_with_state(state.clone(), otp_rate_limit));

    password_routes.merge(otp_routes)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Session> {
    let session = accounts::login(&state.pool, &state.jwt_secret, &req.email, &req.password).await?;
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

/// POST /api/auth/otp/request
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> ApiResult<serde_json::Value> {
    accounts::request_otp(&state.pool, state.notifier.as_ref(), &req.phone).await?;
    Ok(Json(serde_json::json!({
        "message": "A login code has been sent"
    })))
}

#[derive(Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub code: String,
}

/// POST /api/auth/otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpVerifyRequest>,
) -> ApiResult<Session> {
    let session = accounts::verify_otp(&state.pool, &state.jwt_secret, &req.phone, &req.code).await?;
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    accounts::forgot_password(&state.pool, state.notifier.as_ref(), &req.email).await?;
    Ok(Json(serde_json::json!({
        "message": "If the email exists, a reset code has been sent"
    })))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    accounts::reset_password(&state.pool, &req.email, &req.code, &req.new_password).await?;
    Ok(Json(serde_json::json!({
        "message": "Password has been reset"
    })))
}
