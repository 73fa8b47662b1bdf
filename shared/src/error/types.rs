//! `AppError` and the JSON error envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A rejected request: what went wrong, in a form the portal and the diner
/// app can both act on.
///
/// `details` carries the facts a client needs to explain the rejection, e.g.
/// `required`/`available` credits or the `branch_id` a voucher refused.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Malformed input that no specific code covers
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{r} not found")).with_detail("resource", r)
    }

    /// Caller is signed in but may not touch this restaurant or diner
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::AlreadyExists, format!("{r} already exists"))
            .with_detail("resource", r)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }
}

/// Body of every error response: `{ "code": 5002, "message": ..., "details": {...} }`.
///
/// Successful responses are the resource JSON itself, so this only ever
/// describes a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl From<AppError> for ApiResponse {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message,
            details: err.details,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "Request failed with system error");
        }
        (status, axum::Json(ApiResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_from_code() {
        let err = AppError::new(ErrorCode::VoucherNotFound);
        assert_eq!(err.code, ErrorCode::VoucherNotFound);
        assert_eq!(err.message, "Voucher not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_insufficient_credits_details() {
        let err = AppError::new(ErrorCode::InsufficientCredits)
            .with_detail("required", 3)
            .with_detail("available", 1);

        let details = err.details.unwrap();
        assert_eq!(details["required"], 3);
        assert_eq!(details["available"], 1);
    }

    #[test]
    fn test_status_by_outcome() {
        assert_eq!(
            AppError::new(ErrorCode::DinerNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::new(ErrorCode::VoucherAlreadyRedeemed).http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::new(ErrorCode::VoucherExpired).http_status(),
            StatusCode::GONE
        );
    }

    #[test]
    fn test_resource_constructors() {
        let err = AppError::not_found("Branch");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Branch not found");
        assert_eq!(err.details.unwrap()["resource"], "Branch");

        assert_eq!(
            AppError::already_exists("Voucher type").message,
            "Voucher type already exists"
        );
        assert_eq!(
            AppError::permission_denied("Staff only").code,
            ErrorCode::PermissionDenied
        );
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::with_message(ErrorCode::VoucherNotFound, "No voucher for ABCD");
        assert_eq!(err.to_string(), "No voucher for ABCD");
    }

    #[test]
    fn test_wrong_branch_envelope() {
        let err = AppError::new(ErrorCode::VoucherWrongBranch).with_detail("branch_id", 42);
        let json = serde_json::to_value(ApiResponse::error(&err)).unwrap();

        assert_eq!(json["code"], 5005);
        assert_eq!(json["message"], "Voucher cannot be redeemed at this branch");
        assert_eq!(json["details"]["branch_id"], 42);
    }

    #[test]
    fn test_envelope_omits_empty_details() {
        let json = serde_json::to_string(&ApiResponse::from(AppError::new(
            ErrorCode::InternalError,
        )))
        .unwrap();
        assert!(json.contains("\"code\":9001"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_envelope_parses_client_side() {
        let json = r#"{"code":5002,"message":"Voucher has already been redeemed"}"#;
        let body: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.code, 5002);
        assert!(body.details.is_none());
    }
}
