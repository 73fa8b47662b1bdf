//! Campaign rows

use shared::models::{Campaign, CampaignCreate};
use sqlx::PgExecutor;

pub async fn insert(
    conn: impl PgExecutor<'_>,
    id: i64,
    restaurant_id: i64,
    data: &CampaignCreate,
    created_by: i64,
    now: i64,
) -> Result<Campaign, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO campaigns (id, restaurant_id, name, message, channel, status, recipients_count, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, 'draft', 0, $6, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.message)
    .bind(data.channel)
    .bind(created_by)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn list(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<Campaign>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM campaigns WHERE restaurant_id = $1 ORDER BY created_at DESC")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await
}

pub async fn lock(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    campaign_id: i64,
) -> Result<Option<Campaign>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM campaigns WHERE id = $1 AND restaurant_id = $2 FOR UPDATE")
        .bind(campaign_id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

pub async fn mark_sent(
    conn: impl PgExecutor<'_>,
    campaign_id: i64,
    recipients_count: i32,
    now: i64,
) -> Result<Campaign, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE campaigns SET status = 'sent', recipients_count = $1, sent_at = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(recipients_count)
    .bind(now)
    .bind(campaign_id)
    .fetch_one(conn)
    .await
}
