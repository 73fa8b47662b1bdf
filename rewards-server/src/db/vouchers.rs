//! Issued voucher rows

use shared::models::{Voucher, VoucherCategory};
use sqlx::PgExecutor;

/// Insert a voucher; `None` when `(restaurant_id, code)` is already taken.
pub async fn insert_if_code_free(
    conn: impl PgExecutor<'_>,
    v: &Voucher,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO vouchers (
            id, restaurant_id, diner_id, branch_id, voucher_type_id, code, name,
            category, earning_mode, value, free_item_name, credits_spent,
            expiry_date, is_redeemed, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, FALSE, $14)
        ON CONFLICT ON CONSTRAINT uq_voucher_code DO NOTHING
        RETURNING *
        "#,
    )
    .bind(v.id)
    .bind(v.restaurant_id)
    .bind(v.diner_id)
    .bind(v.branch_id)
    .bind(v.voucher_type_id)
    .bind(&v.code)
    .bind(&v.name)
    .bind(v.category)
    .bind(v.earning_mode)
    .bind(v.value)
    .bind(&v.free_item_name)
    .bind(v.credits_spent)
    .bind(v.expiry_date)
    .bind(v.created_at)
    .fetch_optional(conn)
    .await
}

pub async fn find(conn: impl PgExecutor<'_>, id: i64) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vouchers WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn lock(conn: impl PgExecutor<'_>, id: i64) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vouchers WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Compare-and-set redemption. Returns `None` if the voucher was already
/// redeemed by a concurrent request.
pub async fn mark_redeemed(
    conn: impl PgExecutor<'_>,
    id: i64,
    now: i64,
    branch_id: Option<i64>,
    redeemed_by: i64,
    bill_id: Option<&str>,
    presentation_code: &str,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE vouchers SET
            is_redeemed = TRUE, redeemed_at = $1, redeemed_branch_id = $2,
            redeemed_by = $3, bill_id = $4, redeemed_code = $5
        WHERE id = $6 AND is_redeemed = FALSE
        RETURNING *
        "#,
    )
    .bind(now)
    .bind(branch_id)
    .bind(redeemed_by)
    .bind(bill_id)
    .bind(presentation_code)
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Latest voucher of the restaurant redeemed with a presentation code
pub async fn find_by_redeemed_code(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    presentation_code: &str,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM vouchers
        WHERE restaurant_id = $1 AND redeemed_code = $2
        ORDER BY redeemed_at DESC
        LIMIT 1
        "#,
    )
    .bind(restaurant_id)
    .bind(presentation_code)
    .fetch_optional(conn)
    .await
}

pub async fn has_registration_voucher(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
    restaurant_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM vouchers WHERE diner_id = $1 AND restaurant_id = $2 AND category = $3 LIMIT 1",
    )
    .bind(diner_id)
    .bind(restaurant_id)
    .bind(VoucherCategory::Registration)
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn list_for_diner(
    conn: impl PgExecutor<'_>,
    diner_id: i64,
) -> Result<Vec<Voucher>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vouchers WHERE diner_id = $1 ORDER BY created_at DESC")
        .bind(diner_id)
        .fetch_all(conn)
        .await
}

pub async fn list_for_restaurant(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    redeemed: Option<bool>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM vouchers
        WHERE restaurant_id = $1 AND ($2::BOOLEAN IS NULL OR is_redeemed = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(restaurant_id)
    .bind(redeemed)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}

/// `(bill_id, voucher_id)` for vouchers carrying one of `bill_ids`; the oldest
/// voucher wins when a bill id repeats.
pub async fn ids_by_bill(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    bill_ids: &[String],
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT DISTINCT ON (bill_id) bill_id, id
        FROM vouchers
        WHERE restaurant_id = $1 AND bill_id = ANY($2)
        ORDER BY bill_id, created_at
        "#,
    )
    .bind(restaurant_id)
    .bind(bill_ids)
    .fetch_all(conn)
    .await
}

/// Redeemed vouchers with a bill id that no uploaded row has matched
pub async fn unreconciled(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT v.* FROM vouchers v
        WHERE v.restaurant_id = $1
          AND v.is_redeemed
          AND v.bill_id IS NOT NULL
          AND NOT EXISTS (
              SELECT 1 FROM reconciliation_records rr
              JOIN reconciliation_batches rb ON rb.id = rr.batch_id
              WHERE rb.restaurant_id = v.restaurant_id AND rr.bill_id = v.bill_id
          )
        ORDER BY v.redeemed_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}
