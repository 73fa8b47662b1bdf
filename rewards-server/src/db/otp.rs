//! One-time codes: diner phone login and password reset

use sqlx::PgExecutor;

/// Stored code hash with attempt counter
#[derive(sqlx::FromRow)]
pub struct PendingCode {
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: i64,
}

/// Which flow a code belongs to; each has its own table and key column.
#[derive(Debug, Clone, Copy)]
pub enum CodePurpose {
    /// Keyed by phone
    PhoneLogin,
    /// Keyed by user id
    PasswordReset,
}

impl CodePurpose {
    fn table(self) -> &'static str {
        match self {
            Self::PhoneLogin => "otp_codes",
            Self::PasswordReset => "password_reset_tokens",
        }
    }

    fn key_column(self) -> &'static str {
        match self {
            Self::PhoneLogin => "phone",
            Self::PasswordReset => "user_id",
        }
    }
}

/// Either a phone (login) or a user id (reset)
#[derive(Debug, Clone)]
pub enum CodeKey {
    Phone(String),
    User(i64),
}

macro_rules! bind_key {
    ($query:expr, $key:expr) => {
        match $key {
            CodeKey::Phone(phone) => $query.bind(phone.clone()),
            CodeKey::User(id) => $query.bind(*id),
        }
    };
}

pub async fn upsert(
    conn: impl PgExecutor<'_>,
    purpose: CodePurpose,
    key: &CodeKey,
    code_hash: &str,
    expires_at: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {table} ({key}, code_hash, attempts, expires_at, created_at)
         VALUES ($1, $2, 0, $3, $4)
         ON CONFLICT ({key}) DO UPDATE SET
            code_hash = $2, attempts = 0, expires_at = $3, created_at = $4",
        table = purpose.table(),
        key = purpose.key_column(),
    );
    bind_key!(sqlx::query(&sql), key)
        .bind(code_hash)
        .bind(expires_at)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn find(
    conn: impl PgExecutor<'_>,
    purpose: CodePurpose,
    key: &CodeKey,
) -> Result<Option<PendingCode>, sqlx::Error> {
    let sql = format!(
        "SELECT code_hash, attempts, expires_at FROM {} WHERE {} = $1",
        purpose.table(),
        purpose.key_column()
    );
    bind_key!(sqlx::query_as(&sql), key)
        .fetch_optional(conn)
        .await
}

pub async fn increment_attempts(
    conn: impl PgExecutor<'_>,
    purpose: CodePurpose,
    key: &CodeKey,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET attempts = attempts + 1 WHERE {} = $1",
        purpose.table(),
        purpose.key_column()
    );
    bind_key!(sqlx::query(&sql), key).execute(conn).await?;
    Ok(())
}

pub async fn delete(
    conn: impl PgExecutor<'_>,
    purpose: CodePurpose,
    key: &CodeKey,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        purpose.table(),
        purpose.key_column()
    );
    bind_key!(sqlx::query(&sql), key).execute(conn).await?;
    Ok(())
}
