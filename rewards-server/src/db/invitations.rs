//! Diner invitation rows

use shared::models::DinerInvitation;
use sqlx::PgExecutor;

pub async fn insert(conn: impl PgExecutor<'_>, inv: &DinerInvitation) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO diner_invitations (
            id, restaurant_id, branch_id, phone, token_hash, status,
            invited_by, expires_at, created_at
        )
        VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8)
        "#,
    )
    .bind(inv.id)
    .bind(inv.restaurant_id)
    .bind(inv.branch_id)
    .bind(&inv.phone)
    .bind(&inv.token_hash)
    .bind(inv.invited_by)
    .bind(inv.expires_at)
    .bind(inv.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<DinerInvitation>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM diner_invitations WHERE restaurant_id = $1 ORDER BY created_at DESC",
    )
    .bind(restaurant_id)
    .fetch_all(conn)
    .await
}

pub async fn lock_by_token_hash(
    conn: impl PgExecutor<'_>,
    token_hash: &str,
) -> Result<Option<DinerInvitation>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM diner_invitations WHERE token_hash = $1 FOR UPDATE")
        .bind(token_hash)
        .fetch_optional(conn)
        .await
}

pub async fn mark_accepted(
    conn: impl PgExecutor<'_>,
    id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE diner_invitations SET status = 'accepted', accepted_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn mark_expired(conn: impl PgExecutor<'_>, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE diner_invitations SET status = 'expired' WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
