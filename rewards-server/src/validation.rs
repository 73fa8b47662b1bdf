//! Input validation helpers
//!
//! Text length limits and checks shared by the admin handlers.

use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, branch, voucher type, campaign
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, campaign messages, deletion reasons
pub const MAX_NOTE_LEN: usize = 500;

/// SMS body limit (two concatenated segments)
pub const MAX_SMS_LEN: usize = 306;

/// Phone numbers and bill ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Rows per reconciliation upload
pub const MAX_RECONCILIATION_ROWS: usize = 10_000;

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation("email is not a valid address")),
    }
}

/// Phone after normalisation: optional `+`, then 9 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 9 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("phone is not a valid number"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(shared::error::ErrorCode::PasswordTooShort));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Sea Point", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "name", MAX_NAME_LEN).unwrap_err();
        assert!(err.message.contains("too long"));
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "description", 5).is_ok());
        assert!(validate_optional_text(&Some("abc".into()), "description", 5).is_ok());
        assert!(validate_optional_text(&Some("abcdef".into()), "description", 5).is_err());
    }

    #[test]
    fn test_email_and_phone() {
        assert!(validate_email("owner@bistro.co.za").is_ok());
        assert!(validate_email("owner@localhost").is_err());
        assert!(validate_email("@bistro.co.za").is_err());
        assert!(validate_phone("+27821234567").is_ok());
        assert!(validate_phone("0821234567").is_ok());
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn test_password_length() {
        assert_eq!(
            validate_password("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(validate_password("long enough").is_ok());
    }
}
