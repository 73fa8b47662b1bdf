//! Restaurant and branch rows

use shared::models::{Branch, BranchCreate, BranchUpdate, Restaurant};
use sqlx::PgExecutor;

pub async fn find(conn: impl PgExecutor<'_>, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn update(conn: impl PgExecutor<'_>, r: &Restaurant) -> Result<Restaurant, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = $1, email = $2, phone = $3,
            points_per_currency = $4, points_threshold = $5,
            visit_threshold = $6, visit_min_spend = $7,
            voucher_validity_days = $8, loyalty_scope = $9, voucher_scope = $10,
            updated_at = $11
        WHERE id = $12
        RETURNING *
        "#,
    )
    .bind(&r.name)
    .bind(&r.email)
    .bind(&r.phone)
    .bind(r.points_per_currency)
    .bind(r.points_threshold)
    .bind(r.visit_threshold)
    .bind(r.visit_min_spend)
    .bind(r.voucher_validity_days)
    .bind(r.loyalty_scope)
    .bind(r.voucher_scope)
    .bind(r.updated_at)
    .bind(r.id)
    .fetch_one(conn)
    .await
}

// ── Branches ──

pub async fn list_branches(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branches WHERE restaurant_id = $1 ORDER BY is_default DESC, name")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await
}

pub async fn branch_ids(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM branches WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Branch scoped to its restaurant; a branch of another restaurant is `None`.
pub async fn find_branch(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    branch_id: i64,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branches WHERE id = $1 AND restaurant_id = $2")
        .bind(branch_id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

pub async fn create_branch(
    conn: impl PgExecutor<'_>,
    id: i64,
    restaurant_id: i64,
    data: &BranchCreate,
    now: i64,
) -> Result<Branch, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO branches (id, restaurant_id, name, address, phone, is_default, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.address)
    .bind(&data.phone)
    .bind(data.is_default)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn update_branch(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    branch_id: i64,
    data: &BranchUpdate,
    now: i64,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE branches SET
            name = COALESCE($1, name),
            address = COALESCE($2, address),
            phone = COALESCE($3, phone),
            is_active = COALESCE($4, is_active),
            updated_at = $5
        WHERE id = $6 AND restaurant_id = $7
        RETURNING *
        "#,
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.address)
    .bind(&data.phone)
    .bind(data.is_active)
    .bind(now)
    .bind(branch_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

/// Clear the current default; call before marking a new one in the same tx.
pub async fn clear_default_branch(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE branches SET is_default = FALSE, updated_at = $1 WHERE restaurant_id = $2 AND is_default",
    )
    .bind(now)
    .bind(restaurant_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn mark_default_branch(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    branch_id: i64,
    now: i64,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE branches SET is_default = TRUE, updated_at = $1
        WHERE id = $2 AND restaurant_id = $3
        RETURNING *
        "#,
    )
    .bind(now)
    .bind(branch_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}
