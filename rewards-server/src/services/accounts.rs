//! Accounts: portal login, diner phone OTP, password reset, diner self-service
//! and account deletion

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AccountDeletionRequest, DeletionStatus, PointsBalanceDetail, User, UserType, Voucher,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use crate::auth::session::create_token;
use crate::db;
use crate::db::otp::{CodeKey, CodePurpose, PendingCode};
use crate::error::ServiceResult;
use crate::notify::{self, Notifier};
use crate::util::{generate_code, hash_password, normalize_phone, verify_password};
use crate::validation::{MAX_NOTE_LEN, validate_optional_text, validate_password, validate_phone};

/// One-time codes live five minutes
const CODE_TTL_MILLIS: i64 = 5 * 60 * 1000;
/// Wrong guesses allowed per code
const MAX_VERIFY_ATTEMPTS: i32 = 3;

/// Issued JWT with the account it belongs to
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

fn session(user: User, secret: &str) -> ServiceResult<Session> {
    let token = create_token(user.id, user.user_type, secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(Session { token, user })
}

fn check_pending(pending: &PendingCode, now: i64) -> Result<(), AppError> {
    if pending.expires_at < now {
        return Err(AppError::new(ErrorCode::VerificationCodeExpired));
    }
    if pending.attempts >= MAX_VERIFY_ATTEMPTS {
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(())
}

/// Check a submitted code; a wrong guess is counted before failing.
async fn verify_code(
    pool: &PgPool,
    purpose: CodePurpose,
    key: &CodeKey,
    code: &str,
) -> ServiceResult<()> {
    let pending = db::otp::find(pool, purpose, key)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;
    check_pending(&pending, now_millis())?;

    db::otp::increment_attempts(pool, purpose, key).await?;
    if !verify_password(code.trim(), &pending.code_hash) {
        return Err(AppError::new(ErrorCode::VerificationCodeInvalid).into());
    }
    Ok(())
}

// ── Portal login ──

/// Email and password login for restaurant and platform accounts
pub async fn login(
    pool: &PgPool,
    jwt_secret: &str,
    email: &str,
    password: &str,
) -> ServiceResult<Session> {
    let email = email.trim().to_lowercase();
    let user = db::users::find_by_email(pool, &email)
        .await?
        .filter(|u| u.user_type != UserType::Diner)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    let verified = user
        .hashed_password
        .as_deref()
        .is_some_and(|hash| verify_password(password, hash));
    if !verified {
        return Err(AppError::new(ErrorCode::InvalidCredentials).into());
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    tracing::info!(user_id = user.id, user_type = ?user.user_type, "Portal login");
    session(user, jwt_secret)
}

// ── Diner phone OTP ──

/// Send a login code by SMS. Unknown numbers are fine: the diner is created
/// on verification.
pub async fn request_otp(pool: &PgPool, notifier: &dyn Notifier, phone: &str) -> ServiceResult<()> {
    let phone = normalize_phone(phone);
    validate_phone(&phone)?;
    if let Some(user) = db::users::find_by_phone(pool, &phone).await?
        && !user.is_active
    {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    let code = generate_code();
    let code_hash = hash_password(&code).map_err(|_| AppError::new(ErrorCode::InternalError))?;
    let now = now_millis();
    db::otp::upsert(
        pool,
        CodePurpose::PhoneLogin,
        &CodeKey::Phone(phone.clone()),
        &code_hash,
        now + CODE_TTL_MILLIS,
        now,
    )
    .await?;

    if let Err(e) = notifier.send_sms(&phone, &notify::otp_sms(&code)).await {
        tracing::warn!(error = %e, "Failed to send OTP SMS");
    }
    Ok(())
}

/// Exchange a valid code for a diner session, creating the diner if needed.
pub async fn verify_otp(
    pool: &PgPool,
    jwt_secret: &str,
    phone: &str,
    code: &str,
) -> ServiceResult<Session> {
    let phone = normalize_phone(phone);
    validate_phone(&phone)?;
    let key = CodeKey::Phone(phone.clone());
    verify_code(pool, CodePurpose::PhoneLogin, &key, code).await?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let user = db::users::upsert_diner(&mut *tx, snowflake_id(), &phone, now).await?;
    if !user.is_diner() {
        return Err(AppError::new(ErrorCode::InvalidCredentials).into());
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }
    db::otp::delete(&mut *tx, CodePurpose::PhoneLogin, &key).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "Diner signed in");
    session(user, jwt_secret)
}

// ── Password reset ──

/// Email a reset code. Always succeeds so callers cannot probe for accounts.
pub async fn forgot_password(
    pool: &PgPool,
    notifier: &dyn Notifier,
    email: &str,
) -> ServiceResult<()> {
    let email = email.trim().to_lowercase();
    let Some(user) = db::users::find_by_email(pool, &email)
        .await?
        .filter(|u| u.user_type != UserType::Diner && u.is_active)
    else {
        return Ok(());
    };

    let code = generate_code();
    let code_hash = hash_password(&code).map_err(|_| AppError::new(ErrorCode::InternalError))?;
    let now = now_millis();
    db::otp::upsert(
        pool,
        CodePurpose::PasswordReset,
        &CodeKey::User(user.id),
        &code_hash,
        now + CODE_TTL_MILLIS,
        now,
    )
    .await?;

    let (subject, body) = notify::password_reset_email(&code);
    if let Err(e) = notifier.send_email(&email, &subject, &body).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to send password reset email");
    }
    Ok(())
}

pub async fn reset_password(
    pool: &PgPool,
    email: &str,
    code: &str,
    new_password: &str,
) -> ServiceResult<()> {
    validate_password(new_password)?;
    let email = email.trim().to_lowercase();
    let user = db::users::find_by_email(pool, &email)
        .await?
        .filter(|u| u.user_type != UserType::Diner)
        .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;
    let key = CodeKey::User(user.id);
    verify_code(pool, CodePurpose::PasswordReset, &key, code).await?;

    let hashed = hash_password(new_password).map_err(|_| AppError::new(ErrorCode::InternalError))?;
    let now = now_millis();
    let mut tx = pool.begin().await?;
    db::users::update_password(&mut *tx, user.id, &hashed, now).await?;
    db::otp::delete(&mut *tx, CodePurpose::PasswordReset, &key).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "Password reset");
    Ok(())
}

// ── Diner self-service ──

pub async fn balances(pool: &PgPool, diner_id: i64) -> ServiceResult<Vec<PointsBalanceDetail>> {
    Ok(db::balances::list_for_diner(pool, diner_id).await?)
}

pub async fn vouchers(pool: &PgPool, diner_id: i64) -> ServiceResult<Vec<Voucher>> {
    Ok(db::vouchers::list_for_diner(pool, diner_id).await?)
}

// ── Account deletion ──

/// File a deletion request; repeating it returns the pending one.
pub async fn request_deletion(
    pool: &PgPool,
    diner_id: i64,
    reason: Option<String>,
) -> ServiceResult<AccountDeletionRequest> {
    validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;
    let now = now_millis();
    let request =
        db::deletions::request(pool, snowflake_id(), diner_id, reason.as_deref(), now).await?;
    tracing::info!(request_id = request.id, diner_id, "Account deletion requested");
    Ok(request)
}

/// Archive a snapshot of the user, then strip their personal data. Balances,
/// transactions and vouchers stay for the restaurants' books.
pub async fn process_deletion(
    pool: &PgPool,
    request_id: i64,
    processed_by: i64,
) -> ServiceResult<AccountDeletionRequest> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let request = db::deletions::lock(&mut *tx, request_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DeletionRequestNotFound))?;
    if request.status == DeletionStatus::Processed {
        return Err(AppError::new(ErrorCode::DeletionRequestProcessed).into());
    }

    if let Some(user) = db::users::find_by_id(&mut *tx, request.user_id).await? {
        let balances = db::balances::list_for_diner(&mut *tx, user.id).await?;
        let snapshot = serde_json::json!({
            "user": user,
            "balances": balances,
        });
        db::deletions::archive_user(&mut *tx, snowflake_id(), user.id, &snapshot, now).await?;
        db::users::anonymise(&mut *tx, user.id, now).await?;
    }

    let request = db::deletions::mark_processed(&mut *tx, request.id, now).await?;
    db::activity::log(
        &mut *tx,
        None,
        Some(processed_by),
        "account_deleted",
        Some(&serde_json::json!({ "request_id": request.id, "user_id": request.user_id })),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(request_id = request.id, user_id = request.user_id, "Account deletion processed");
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(attempts: i32, expires_at: i64) -> PendingCode {
        PendingCode {
            code_hash: String::new(),
            attempts,
            expires_at,
        }
    }

    #[test]
    fn test_check_pending() {
        assert!(check_pending(&pending(0, 2_000), 1_000).is_ok());
        assert!(check_pending(&pending(MAX_VERIFY_ATTEMPTS - 1, 2_000), 1_000).is_ok());
        assert_eq!(
            check_pending(&pending(MAX_VERIFY_ATTEMPTS, 2_000), 1_000)
                .unwrap_err()
                .code,
            ErrorCode::TooManyAttempts
        );
        // Expiry is reported before attempts
        assert_eq!(
            check_pending(&pending(MAX_VERIFY_ATTEMPTS, 999), 1_000)
                .unwrap_err()
                .code,
            ErrorCode::VerificationCodeExpired
        );
    }

    #[test]
    fn test_session_token_decodes() {
        let user = User {
            id: 42,
            user_type: UserType::Restaurant,
            phone: None,
            email: Some("owner@example.com".into()),
            name: None,
            hashed_password: None,
            active_voucher_code: None,
            active_voucher_id: None,
            active_voucher_code_set_at: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let s = session(user, "test-secret").unwrap();
        let identity = crate::auth::session::decode_token(&s.token, "test-secret").unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.user_type, UserType::Restaurant);
    }
}
