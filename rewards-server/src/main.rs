//! rewards-server: restaurant loyalty backend
//!
//! Long-running service that:
//! - Accrues points and visits from bill captures
//! - Issues vouchers against points and visit thresholds
//! - Lets diners present vouchers and staff redeem them at the till
//! - Reconciles uploaded POS bills against redeemed vouchers

mod api;
mod auth;
mod config;
mod db;
mod error;
mod loyalty;
mod notify;
mod services;
mod state;
mod util;
mod validation;

use std::net::SocketAddr;

use config::Config;
use error::BoxError;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rewards_server=info,tower_http=info".into());
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env()?;

    tracing::info!("Starting rewards-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::create_router(state.clone());

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("rewards-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
