//! Account deletion requests and archived users

use shared::models::AccountDeletionRequest;
use sqlx::PgExecutor;

/// Insert a pending request; an existing pending one is returned instead.
pub async fn request(
    conn: impl PgExecutor<'_>,
    id: i64,
    user_id: i64,
    reason: Option<&str>,
    now: i64,
) -> Result<AccountDeletionRequest, sqlx::Error> {
    sqlx::query_as(
        r#"
        WITH existing AS (
            SELECT * FROM account_deletion_requests
            WHERE user_id = $2 AND status = 'pending'
            LIMIT 1
        ), inserted AS (
            INSERT INTO account_deletion_requests (id, user_id, reason, status, requested_at)
            SELECT $1, $2, $3, 'pending'::deletion_status, $4
            WHERE NOT EXISTS (SELECT 1 FROM existing)
            RETURNING *
        )
        SELECT * FROM inserted
        UNION ALL
        SELECT * FROM existing
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(reason)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn lock(
    conn: impl PgExecutor<'_>,
    id: i64,
) -> Result<Option<AccountDeletionRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM account_deletion_requests WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn mark_processed(
    conn: impl PgExecutor<'_>,
    id: i64,
    now: i64,
) -> Result<AccountDeletionRequest, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE account_deletion_requests SET status = 'processed', processed_at = $1
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(now)
    .bind(id)
    .fetch_one(conn)
    .await
}

pub async fn archive_user(
    conn: impl PgExecutor<'_>,
    id: i64,
    original_user_id: i64,
    snapshot: &serde_json::Value,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO archived_users (id, original_user_id, snapshot, archived_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(original_user_id)
    .bind(snapshot)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}
