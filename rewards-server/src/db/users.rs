//! User rows: diners, portal accounts, presentation codes

use shared::models::{User, UserType};
use sqlx::PgExecutor;

pub async fn find_by_id(conn: impl PgExecutor<'_>, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn find_by_email(
    conn: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await
}

pub async fn find_by_phone(
    conn: impl PgExecutor<'_>,
    phone: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE phone = $1")
        .bind(phone)
        .fetch_optional(conn)
        .await
}

/// Find or create the diner for a phone number.
pub async fn upsert_diner(
    conn: impl PgExecutor<'_>,
    id: i64,
    phone: &str,
    now: i64,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO users (id, user_type, phone, is_active, created_at, updated_at)
        VALUES ($1, 'diner', $2, TRUE, $3, $3)
        ON CONFLICT (phone) DO UPDATE SET updated_at = users.updated_at
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(phone)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn create_account(
    conn: impl PgExecutor<'_>,
    id: i64,
    user_type: UserType,
    email: &str,
    name: Option<&str>,
    hashed_password: &str,
    now: i64,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO users (id, user_type, email, name, hashed_password, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_type)
    .bind(email)
    .bind(name)
    .bind(hashed_password)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn update_password(
    conn: impl PgExecutor<'_>,
    id: i64,
    hashed_password: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = $2 WHERE id = $3")
        .bind(hashed_password)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

// ── Presentation codes ──

/// Whether another user holds `code` inside the live window.
pub async fn presentation_code_in_use(
    conn: impl PgExecutor<'_>,
    code: &str,
    live_since: i64,
    except_user: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id FROM users
        WHERE active_voucher_code = $1
          AND active_voucher_code_set_at >= $2
          AND id <> $3
        LIMIT 1
        "#,
    )
    .bind(code)
    .bind(live_since)
    .bind(except_user)
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn set_presentation_code(
    conn: impl PgExecutor<'_>,
    user_id: i64,
    code: &str,
    voucher_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET active_voucher_code = $1, active_voucher_id = $2,
            active_voucher_code_set_at = $3, updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(code)
    .bind(voucher_id)
    .bind(now)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn clear_presentation_code(
    conn: impl PgExecutor<'_>,
    user_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET active_voucher_code = NULL, active_voucher_id = NULL,
            active_voucher_code_set_at = NULL, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(now)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_presentation_code(
    conn: impl PgExecutor<'_>,
    code: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM users
        WHERE active_voucher_code = $1
        ORDER BY active_voucher_code_set_at DESC
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(conn)
    .await
}

// ── Account lifecycle ──

/// Strip personal data and disable the account; rows keep their id so
/// transactions and vouchers stay consistent.
pub async fn anonymise(conn: impl PgExecutor<'_>, id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET phone = NULL, email = NULL, name = NULL, hashed_password = NULL,
            active_voucher_code = NULL, active_voucher_id = NULL,
            active_voucher_code_set_at = NULL, is_active = FALSE, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
