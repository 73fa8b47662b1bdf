//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Restaurant errors
/// - 4xxx: Loyalty errors
/// - 5xxx: Voucher errors
/// - 6xxx: Administration errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Restaurant errors (3xxx)
    Restaurant,
    /// Loyalty errors (4xxx)
    Loyalty,
    /// Voucher errors (5xxx)
    Voucher,
    /// Administration errors (6xxx)
    Admin,
    /// System errors (9xxx, and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Restaurant,
            4000..5000 => Self::Loyalty,
            5000..6000 => Self::Voucher,
            6000..7000 => Self::Admin,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Restaurant => "restaurant",
            Self::Loyalty => "loyalty",
            Self::Voucher => "voucher",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3101), ErrorCategory::Restaurant);
        assert_eq!(ErrorCategory::from_code(4004), ErrorCategory::Loyalty);
        assert_eq!(ErrorCategory::from_code(5005), ErrorCategory::Voucher);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Admin);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::RoleRequired.category(), ErrorCategory::Permission);
        assert_eq!(
            ErrorCode::BranchNotFound.category(),
            ErrorCategory::Restaurant
        );
        assert_eq!(
            ErrorCode::InsufficientCredits.category(),
            ErrorCategory::Loyalty
        );
        assert_eq!(
            ErrorCode::VoucherAlreadyRedeemed.category(),
            ErrorCategory::Voucher
        );
        assert_eq!(ErrorCode::EmptyUpload.category(), ErrorCategory::Admin);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Voucher).unwrap();
        assert_eq!(json, "\"voucher\"");

        let category: ErrorCategory = serde_json::from_str("\"loyalty\"").unwrap();
        assert_eq!(category, ErrorCategory::Loyalty);
        assert_eq!(category.name(), "loyalty");
    }
}
