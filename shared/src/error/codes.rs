//! Unified error codes for the rewards platform
//!
//! This module defines all error codes returned by the rewards API.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Loyalty errors
//! - 5xxx: Voucher errors
//! - 6xxx: Administration errors (reconciliation, campaigns, invitations)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Verification code expired
    VerificationCodeExpired = 1013,
    /// Verification code invalid
    VerificationCodeInvalid = 1014,
    /// Too many verification attempts
    TooManyAttempts = 1015,
    /// Password too short
    PasswordTooShort = 1018,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific portal role required
    RoleRequired = 2002,
    /// Platform administrator required
    AdminRequired = 2003,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant is inactive
    RestaurantInactive = 3002,
    /// Branch not found
    BranchNotFound = 3101,
    /// Branch id is required for branch-scoped loyalty
    BranchRequired = 3102,
    /// Branch is inactive
    BranchInactive = 3103,
    /// Portal user not found
    PortalUserNotFound = 3201,
    /// Portal user already exists
    PortalUserExists = 3202,

    // ==================== 4xxx: Loyalty ====================
    /// Diner not found
    DinerNotFound = 4001,
    /// Spend amount is invalid
    InvalidAmount = 4002,
    /// Points balance not found
    BalanceNotFound = 4003,
    /// Not enough credits to issue the voucher
    InsufficientCredits = 4004,
    /// Loyalty configuration is invalid
    InvalidLoyaltyConfig = 4005,

    // ==================== 5xxx: Voucher ====================
    /// Voucher not found
    VoucherNotFound = 5001,
    /// Voucher has already been redeemed
    VoucherAlreadyRedeemed = 5002,
    /// Voucher is past its expiry date
    VoucherExpired = 5003,
    /// Presented code is past its presentation window
    PresentationCodeExpired = 5004,
    /// Voucher cannot be redeemed at this branch
    VoucherWrongBranch = 5005,
    /// Presented code not recognised
    PresentationCodeNotFound = 5006,
    /// Could not allocate a unique code
    VoucherCodeExhausted = 5007,
    /// Voucher type not found
    VoucherTypeNotFound = 5101,
    /// Voucher type is inactive
    VoucherTypeInactive = 5102,
    /// Diner already holds a registration voucher
    RegistrationVoucherExists = 5103,
    /// Restaurant already has a registration voucher type
    RegistrationTypeExists = 5104,

    // ==================== 6xxx: Administration ====================
    /// Reconciliation batch not found
    BatchNotFound = 6001,
    /// Reconciliation upload has no rows
    EmptyUpload = 6002,
    /// Campaign not found
    CampaignNotFound = 6101,
    /// Campaign has already been sent
    CampaignAlreadySent = 6102,
    /// Invitation not found
    InvitationNotFound = 6201,
    /// Invitation has expired
    InvitationExpired = 6202,
    /// Invitation has already been accepted
    InvitationAlreadyAccepted = 6203,
    /// Account deletion request not found
    DeletionRequestNotFound = 6301,
    /// Account deletion request already processed
    DeletionRequestProcessed = 6302,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Notification delivery failed
    NotificationFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::VerificationCodeExpired => "Verification code has expired",
            ErrorCode::VerificationCodeInvalid => "Invalid verification code",
            ErrorCode::TooManyAttempts => "Too many attempts",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Owner or manager role is required",
            ErrorCode::AdminRequired => "Platform administrator is required",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantInactive => "Restaurant is inactive",
            ErrorCode::BranchNotFound => "Branch not found",
            ErrorCode::BranchRequired => "Branch is required for branch-scoped loyalty",
            ErrorCode::BranchInactive => "Branch is inactive",
            ErrorCode::PortalUserNotFound => "Portal user not found",
            ErrorCode::PortalUserExists => "User is already a member of this restaurant",

            // Loyalty
            ErrorCode::DinerNotFound => "Diner not found",
            ErrorCode::InvalidAmount => "Invalid spend amount",
            ErrorCode::BalanceNotFound => "Points balance not found",
            ErrorCode::InsufficientCredits => "Not enough credits for this voucher",
            ErrorCode::InvalidLoyaltyConfig => "Invalid loyalty configuration",

            // Voucher
            ErrorCode::VoucherNotFound => "Voucher not found",
            ErrorCode::VoucherAlreadyRedeemed => "Voucher has already been redeemed",
            ErrorCode::VoucherExpired => "Voucher has expired",
            ErrorCode::PresentationCodeExpired => "Presented code has expired",
            ErrorCode::VoucherWrongBranch => "Voucher cannot be redeemed at this branch",
            ErrorCode::PresentationCodeNotFound => "Presented code not recognised",
            ErrorCode::VoucherCodeExhausted => "Could not allocate a unique voucher code",
            ErrorCode::VoucherTypeNotFound => "Voucher type not found",
            ErrorCode::VoucherTypeInactive => "Voucher type is inactive",
            ErrorCode::RegistrationVoucherExists => "Registration voucher already issued",
            ErrorCode::RegistrationTypeExists => {
                "Restaurant already has a registration voucher type"
            }

            // Administration
            ErrorCode::BatchNotFound => "Reconciliation batch not found",
            ErrorCode::EmptyUpload => "Upload contains no rows",
            ErrorCode::CampaignNotFound => "Campaign not found",
            ErrorCode::CampaignAlreadySent => "Campaign has already been sent",
            ErrorCode::InvitationNotFound => "Invitation not found",
            ErrorCode::InvitationExpired => "Invitation has expired",
            ErrorCode::InvitationAlreadyAccepted => "Invitation has already been accepted",
            ErrorCode::DeletionRequestNotFound => "Deletion request not found",
            ErrorCode::DeletionRequestProcessed => "Deletion request already processed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1013 => Ok(ErrorCode::VerificationCodeExpired),
            1014 => Ok(ErrorCode::VerificationCodeInvalid),
            1015 => Ok(ErrorCode::TooManyAttempts),
            1018 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3002 => Ok(ErrorCode::RestaurantInactive),
            3101 => Ok(ErrorCode::BranchNotFound),
            3102 => Ok(ErrorCode::BranchRequired),
            3103 => Ok(ErrorCode::BranchInactive),
            3201 => Ok(ErrorCode::PortalUserNotFound),
            3202 => Ok(ErrorCode::PortalUserExists),

            // Loyalty
            4001 => Ok(ErrorCode::DinerNotFound),
            4002 => Ok(ErrorCode::InvalidAmount),
            4003 => Ok(ErrorCode::BalanceNotFound),
            4004 => Ok(ErrorCode::InsufficientCredits),
            4005 => Ok(ErrorCode::InvalidLoyaltyConfig),

            // Voucher
            5001 => Ok(ErrorCode::VoucherNotFound),
            5002 => Ok(ErrorCode::VoucherAlreadyRedeemed),
            5003 => Ok(ErrorCode::VoucherExpired),
            5004 => Ok(ErrorCode::PresentationCodeExpired),
            5005 => Ok(ErrorCode::VoucherWrongBranch),
            5006 => Ok(ErrorCode::PresentationCodeNotFound),
            5007 => Ok(ErrorCode::VoucherCodeExhausted),
            5101 => Ok(ErrorCode::VoucherTypeNotFound),
            5102 => Ok(ErrorCode::VoucherTypeInactive),
            5103 => Ok(ErrorCode::RegistrationVoucherExists),
            5104 => Ok(ErrorCode::RegistrationTypeExists),

            // Administration
            6001 => Ok(ErrorCode::BatchNotFound),
            6002 => Ok(ErrorCode::EmptyUpload),
            6101 => Ok(ErrorCode::CampaignNotFound),
            6102 => Ok(ErrorCode::CampaignAlreadySent),
            6201 => Ok(ErrorCode::InvitationNotFound),
            6202 => Ok(ErrorCode::InvitationExpired),
            6203 => Ok(ErrorCode::InvitationAlreadyAccepted),
            6301 => Ok(ErrorCode::DeletionRequestNotFound),
            6302 => Ok(ErrorCode::DeletionRequestProcessed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NotificationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::RestaurantNotFound.code(), 3001);
        assert_eq!(ErrorCode::DinerNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientCredits.code(), 4004);
        assert_eq!(ErrorCode::VoucherAlreadyRedeemed.code(), 5002);
        assert_eq!(ErrorCode::RegistrationTypeExists.code(), 5104);
        assert_eq!(ErrorCode::BatchNotFound.code(), 6001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::TooManyAttempts,
            ErrorCode::RoleRequired,
            ErrorCode::BranchRequired,
            ErrorCode::InvalidAmount,
            ErrorCode::VoucherWrongBranch,
            ErrorCode::PresentationCodeExpired,
            ErrorCode::InvitationExpired,
            ErrorCode::DeletionRequestProcessed,
            ErrorCode::NotificationFailed,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::VoucherExpired).unwrap();
        assert_eq!(json, "5003");

        let code: ErrorCode = serde_json::from_str("4004").unwrap();
        assert_eq!(code, ErrorCode::InsufficientCredits);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::VoucherNotFound.to_string(), "5001");
    }
}
