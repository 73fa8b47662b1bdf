//! Points balance rows
//!
//! Read-modify-write always goes `ensure` -> `lock` -> `save` inside one
//! transaction.

use shared::models::{DinerBalanceRow, PointsBalance, PointsBalanceDetail};
use sqlx::PgExecutor;

/// Insert an empty balance for the scope if none exists.
pub async fn ensure(
    conn: impl PgExecutor<'_>,
    id: i64,
    diner_id: i64,
    restaurant_id: i64,
    branch_id: Option<i64>,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO points_balances (id, diner_id, restaurant_id, branch_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        ON CONFLICT ON CONSTRAINT uq_points_balance_scope DO NOTHING
        "#,
    )
    .bind(id)
    .bind(diner_id)
    .bind(restaurant_id)
    .bind(branch_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn lock(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
    restaurant_id: i64,
    branch_id: Option<i64>,
) -> Result<Option<PointsBalance>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM points_balances
        WHERE diner_id = $1 AND restaurant_id = $2 AND branch_id IS NOT DISTINCT FROM $3
        FOR UPDATE
        "#,
    )
    .bind(diner_id)
    .bind(restaurant_id)
    .bind(branch_id)
    .fetch_optional(conn)
    .await
}

/// Persist every counter of a locked balance.
pub async fn save(conn: impl PgExecutor<'_>, b: &PointsBalance) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE points_balances SET
            current_points = $1, current_visits = $2,
            points_credits = $3, visit_credits = $4,
            total_points_earned = $5, total_visits = $6, total_spent = $7,
            total_points_credits_banked = $8, total_visit_credits_banked = $9,
            total_vouchers_generated = $10, total_voucher_credits_earned = $11,
            updated_at = $12
        WHERE id = $13
        "#,
    )
    .bind(b.current_points)
    .bind(b.current_visits)
    .bind(b.points_credits)
    .bind(b.visit_credits)
    .bind(b.total_points_earned)
    .bind(b.total_visits)
    .bind(b.total_spent)
    .bind(b.total_points_credits_banked)
    .bind(b.total_visit_credits_banked)
    .bind(b.total_vouchers_generated)
    .bind(b.total_voucher_credits_earned)
    .bind(b.updated_at)
    .bind(b.id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Whether the diner already has any balance at the restaurant
pub async fn exists_for(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
    restaurant_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM points_balances WHERE diner_id = $1 AND restaurant_id = $2 LIMIT 1",
    )
    .bind(diner_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn list_for_diner(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
) -> Result<Vec<PointsBalanceDetail>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT pb.*, r.name AS restaurant_name, b.name AS branch_name,
               r.points_threshold, r.visit_threshold
        FROM points_balances pb
        JOIN restaurants r ON r.id = pb.restaurant_id
        LEFT JOIN branches b ON b.id = pb.branch_id
        WHERE pb.diner_id = $1
        ORDER BY pb.updated_at DESC
        "#,
    )
    .bind(diner_id)
    .fetch_all(conn)
    .await
}

pub async fn list_for_restaurant(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    branch_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DinerBalanceRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT pb.diner_id, u.name AS diner_name, u.phone AS diner_phone, pb.branch_id,
               pb.current_points, pb.current_visits, pb.points_credits, pb.visit_credits,
               pb.total_spent, pb.updated_at
        FROM points_balances pb
        JOIN users u ON u.id = pb.diner_id
        WHERE pb.restaurant_id = $1 AND ($2::BIGINT IS NULL OR pb.branch_id = $2)
        ORDER BY pb.updated_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(restaurant_id)
    .bind(branch_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}

/// Contact details of every diner with a balance at the restaurant
pub async fn recipients(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<(i64, Option<String>, Option<String>)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT DISTINCT u.id, u.phone, u.email
        FROM points_balances pb
        JOIN users u ON u.id = pb.diner_id
        WHERE pb.restaurant_id = $1 AND u.is_active
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(conn)
    .await
}
