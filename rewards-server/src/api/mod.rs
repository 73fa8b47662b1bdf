//! HTTP API
//!
//! Public routes (health, login, OTP) sit beside the protected routes, which
//! all pass through `auth_middleware`. Handlers check the caller's access and
//! delegate to `services`.

pub mod admin;
pub mod auth;
pub mod diners;
pub mod engagement;
pub mod health;
pub mod reconciliation;
pub mod redemption;
pub mod restaurants;
pub mod staff;
pub mod transactions;

use axum::routing::get;
use axum::{Router, middleware};
use serde::Deserialize;
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::session::auth_middleware;
use crate::db;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// `?limit=&offset=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> (i64, i64) {
        db::page(self.limit, self.offset)
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(diners::router())
        .merge(transactions::router())
        .merge(restaurants::router())
        .merge(redemption::router())
        .merge(reconciliation::router())
        .merge(staff::router())
        .merge(engagement::router())
        .merge(admin::router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router(&state))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use http::{Request, StatusCode};
    use shared::models::UserType;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::session::create_token;
    use crate::config::{Config, NotifyMode};
    use crate::notify::testing::RecordingNotifier;

    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/rewards_test".into(),
            db_max_connections: 1,
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-secret".into(),
            ses_from_email: "noreply@example.com".into(),
            notify_mode: NotifyMode::Log,
            presentation_code_ttl_secs: 900,
            invitation_ttl_hours: 72,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState::with_parts(pool, Arc::new(RecordingNotifier::default()), &config)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/restaurants/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/diners/7/balances")
                    .header("Authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_diner_cannot_read_another_diner() {
        let app = create_router(test_state());
        let token = create_token(7, UserType::Diner, "test-secret").unwrap();
        let response = app
            .oneshot(
                Request::get("/api/diners/8/vouchers")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_platform_route_rejects_diner() {
        let app = create_router(test_state());
        let token = create_token(7, UserType::Diner, "test-secret").unwrap();
        let response = app
            .oneshot(
                Request::post("/api/admin/deletion-requests/1/process")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_otp_rate_limited_per_ip() {
        let app = create_router(test_state());
        // An invalid phone fails validation before touching the database
        let request = || {
            Request::post("/api/auth/otp/request")
                .header("content-type", "application/json")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::from(r#"{"phone":"123"}"#))
                .unwrap()
        };
        for _ in 0..3 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
