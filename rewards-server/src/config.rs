//! Server configuration

use crate::error::BoxError;

/// How outbound SMS/email is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    /// Write messages to the log only (development)
    Log,
    /// Email through AWS SES; SMS is logged until an SMS gateway is configured
    Ses,
}

impl NotifyMode {
    fn parse(value: &str) -> Result<Self, BoxError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "ses" => Ok(Self::Ses),
            other => Err(format!("unknown NOTIFY_MODE: {other}").into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for portal and diner sessions
    pub jwt_secret: String,
    /// SES sender email address
    pub ses_from_email: String,
    pub notify_mode: NotifyMode,
    /// Lifetime of a diner's presentation code
    pub presentation_code_ttl_secs: u64,
    pub invitation_ttl_hours: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let default_notify = if environment == "development" {
            "log"
        } else {
            "ses"
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@rewards.local".into()),
            notify_mode: NotifyMode::parse(
                &std::env::var("NOTIFY_MODE").unwrap_or_else(|_| default_notify.into()),
            )?,
            presentation_code_ttl_secs: Self::parse_or("PRESENTATION_CODE_TTL_SECS", 900),
            invitation_ttl_hours: Self::parse_or("INVITATION_TTL_HOURS", 72),
            environment,
        })
    }

    pub fn presentation_code_ttl_millis(&self) -> i64 {
        self.presentation_code_ttl_secs as i64 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_mode_parse() {
        assert_eq!(NotifyMode::parse("log").unwrap(), NotifyMode::Log);
        assert_eq!(NotifyMode::parse(" SES ").unwrap(), NotifyMode::Ses);
        assert!(NotifyMode::parse("carrier-pigeon").is_err());
    }
}
