//! Activity log

use shared::models::ActivityLog;
use sqlx::PgExecutor;

/// Write an activity entry
pub async fn log(
    conn: impl PgExecutor<'_>,
    restaurant_id: Option<i64>,
    user_id: Option<i64>,
    action: &str,
    detail: Option<&serde_json::Value>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activity_logs (restaurant_id, user_id, action, detail, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(restaurant_id)
    .bind(user_id)
    .bind(action)
    .bind(detail)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn query(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM activity_logs WHERE restaurant_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}
