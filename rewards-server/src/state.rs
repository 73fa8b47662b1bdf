//! Application state

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::rate_limit::RateLimiter;
use crate::config::{Config, NotifyMode};
use crate::error::BoxError;
use crate::notify::{LogNotifier, Notifier, SesNotifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// SMS / email delivery
    pub notifier: Arc<dyn Notifier>,
    /// JWT secret for all sessions
    pub jwt_secret: String,
    /// Rate limiter for login/OTP routes
    pub rate_limiter: RateLimiter,
    /// Lifetime of a presentation code
    pub presentation_ttl_millis: i64,
    pub invitation_ttl_millis: i64,
}

impl AppState {
    /// Connect, migrate and wire the notifier
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let notifier: Arc<dyn Notifier> = match config.notify_mode {
            NotifyMode::Log => Arc::new(LogNotifier),
            NotifyMode::Ses => Arc::new(SesNotifier::from_env(config.ses_from_email.clone()).await),
        };
        tracing::info!(mode = ?config.notify_mode, "Notifier ready");

        Ok(Self::with_parts(pool, notifier, config))
    }

    pub fn with_parts(pool: PgPool, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        Self {
            pool,
            notifier,
            jwt_secret: config.jwt_secret.clone(),
            rate_limiter: RateLimiter::new(),
            presentation_ttl_millis: config.presentation_code_ttl_millis(),
            invitation_ttl_millis: config.invitation_ttl_hours as i64 * 60 * 60 * 1000,
        }
    }
}
