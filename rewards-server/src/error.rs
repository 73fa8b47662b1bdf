//! Service-layer error type
//!
//! `ServiceError` sits between DB-layer errors (`sqlx::Error`, `BoxError`)
//! and the API-layer error (`AppError`), so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, AWS SDK, serde, etc.)
    Db(BoxError),
    /// Business-rule error
    App(AppError),
}

/// Unique indexes a concurrent request can trip after passing the
/// read-side check; the loser gets the typed conflict.
pub fn conflict_for_constraint(constraint: &str) -> Option<ErrorCode> {
    match constraint {
        "idx_vouchers_one_registration" => Some(ErrorCode::RegistrationVoucherExists),
        "idx_voucher_types_one_registration" => Some(ErrorCode::RegistrationTypeExists),
        _ => None,
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error()
            && db_err.is_unique_violation()
            && let Some(code) = db_err.constraint().and_then(conflict_for_constraint)
        {
            return ServiceError::App(AppError::new(code));
        }
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        ServiceError::App(AppError::new(code))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let err: ServiceError = AppError::new(ErrorCode::VoucherExpired).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::VoucherExpired);
    }

    #[test]
    fn test_db_error_becomes_internal() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_registration_races_map_to_conflicts() {
        assert_eq!(
            conflict_for_constraint("idx_vouchers_one_registration"),
            Some(ErrorCode::RegistrationVoucherExists)
        );
        assert_eq!(
            conflict_for_constraint("idx_voucher_types_one_registration"),
            Some(ErrorCode::RegistrationTypeExists)
        );
        assert_eq!(conflict_for_constraint("uq_voucher_code"), None);

        let schema = include_str!("../migrations/0001_init.sql");
        for name in ["idx_vouchers_one_registration", "idx_voucher_types_one_registration"] {
            assert!(schema.contains(&format!("CREATE UNIQUE INDEX {name}")));
        }
    }

    #[test]
    fn test_error_code_conversion() {
        let err: ServiceError = ErrorCode::InsufficientCredits.into();
        assert!(matches!(err, ServiceError::App(ref e) if e.code == ErrorCode::InsufficientCredits));
    }
}
