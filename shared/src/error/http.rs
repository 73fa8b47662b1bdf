//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RestaurantNotFound
            | Self::BranchNotFound
            | Self::PortalUserNotFound
            | Self::DinerNotFound
            | Self::BalanceNotFound
            | Self::VoucherNotFound
            | Self::PresentationCodeNotFound
            | Self::VoucherTypeNotFound
            | Self::BatchNotFound
            | Self::CampaignNotFound
            | Self::InvitationNotFound
            | Self::DeletionRequestNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::PortalUserExists
            | Self::InsufficientCredits
            | Self::VoucherAlreadyRedeemed
            | Self::RegistrationVoucherExists
            | Self::RegistrationTypeExists
            | Self::CampaignAlreadySent
            | Self::InvitationAlreadyAccepted
            | Self::DeletionRequestProcessed => StatusCode::CONFLICT,

            // 410 Gone (time window elapsed)
            Self::VoucherExpired | Self::PresentationCodeExpired | Self::InvitationExpired => {
                StatusCode::GONE
            }

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled
            | Self::VerificationCodeInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::VoucherWrongBranch
            | Self::RestaurantInactive
            | Self::BranchInactive
            | Self::VoucherTypeInactive => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::NotificationFailed
            | Self::VoucherCodeExhausted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DinerNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::RestaurantNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::PresentationCodeNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::VoucherAlreadyRedeemed.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::InsufficientCredits.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::RegistrationVoucherExists.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::RegistrationTypeExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_expiry_status() {
        assert_eq!(ErrorCode::VoucherExpired.http_status(), StatusCode::GONE);
        assert_eq!(
            ErrorCode::PresentationCodeExpired.http_status(),
            StatusCode::GONE
        );
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(
            ErrorCode::VoucherWrongBranch.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::RoleRequired.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InvalidAmount.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::BranchRequired.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::EmptyUpload.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::VoucherCodeExhausted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
