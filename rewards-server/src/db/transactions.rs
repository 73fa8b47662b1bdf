//! Spend log rows (insert-only)

use shared::models::Transaction;
use sqlx::PgExecutor;

pub async fn insert(conn: impl PgExecutor<'_>, t: &Transaction) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, diner_id, restaurant_id, branch_id, amount_spent, points_earned,
            visit_counted, points_credits_earned, visit_credits_earned,
            bill_id, voucher_type_id, captured_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(t.id)
    .bind(t.diner_id)
    .bind(t.restaurant_id)
    .bind(t.branch_id)
    .bind(t.amount_spent)
    .bind(t.points_earned)
    .bind(t.visit_counted)
    .bind(t.points_credits_earned)
    .bind(t.visit_credits_earned)
    .bind(&t.bill_id)
    .bind(t.voucher_type_id)
    .bind(t.captured_by)
    .bind(t.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_for_diner(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM transactions
        WHERE diner_id = $1 AND restaurant_id = $2
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(diner_id)
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}
