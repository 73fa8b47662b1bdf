//! Voucher type rows

use shared::models::{VoucherCategory, VoucherType, VoucherTypeCreate};
use sqlx::PgExecutor;

pub async fn list(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<VoucherType>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM voucher_types WHERE restaurant_id = $1 ORDER BY created_at")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: impl PgExecutor<'_>, id: i64) -> Result<Option<VoucherType>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM voucher_types WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// The restaurant's registration type, active or not
pub async fn find_registration(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Option<VoucherType>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM voucher_types WHERE restaurant_id = $1 AND category = $2")
        .bind(restaurant_id)
        .bind(VoucherCategory::Registration)
        .fetch_optional(conn)
        .await
}

pub async fn insert(
    conn: impl PgExecutor<'_>,
    id: i64,
    restaurant_id: i64,
    data: &VoucherTypeCreate,
    now: i64,
) -> Result<VoucherType, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO voucher_types (
            id, restaurant_id, name, description, category, value, free_item_name,
            earning_mode, credits_cost, validity_days, points_per_currency,
            is_active, redemption_scope, redeemable_branch_ids, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $13, $14, $14)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.category)
    .bind(data.value)
    .bind(&data.free_item_name)
    .bind(data.earning_mode)
    .bind(data.credits_cost)
    .bind(data.validity_days)
    .bind(data.points_per_currency)
    .bind(data.redemption_scope)
    .bind(&data.redeemable_branch_ids)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn save(conn: impl PgExecutor<'_>, vt: &VoucherType) -> Result<VoucherType, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE voucher_types SET
            name = $1, description = $2, value = $3, free_item_name = $4,
            credits_cost = $5, validity_days = $6, points_per_currency = $7,
            is_active = $8, redemption_scope = $9, redeemable_branch_ids = $10,
            updated_at = $11
        WHERE id = $12
        RETURNING *
        "#,
    )
    .bind(&vt.name)
    .bind(&vt.description)
    .bind(vt.value)
    .bind(&vt.free_item_name)
    .bind(vt.credits_cost)
    .bind(vt.validity_days)
    .bind(vt.points_per_currency)
    .bind(vt.is_active)
    .bind(vt.redemption_scope)
    .bind(&vt.redeemable_branch_ids)
    .bind(vt.updated_at)
    .bind(vt.id)
    .fetch_one(conn)
    .await
}
