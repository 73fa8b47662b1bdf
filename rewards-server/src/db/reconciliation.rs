//! Reconciliation batch and record rows

use shared::models::{ReconciliationBatch, ReconciliationRecord};
use sqlx::PgExecutor;

use crate::loyalty::reconciliation::MatchSummary;

pub async fn insert_batch(
    conn: impl PgExecutor<'_>,
    b: &ReconciliationBatch,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO reconciliation_batches (
            id, restaurant_id, file_name, uploaded_by,
            total_records, matched_records, unmatched_records, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(b.id)
    .bind(b.restaurant_id)
    .bind(&b.file_name)
    .bind(b.uploaded_by)
    .bind(b.total_records)
    .bind(b.matched_records)
    .bind(b.unmatched_records)
    .bind(b.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Bulk insert with UNNEST; `ids` pairs with `summary.rows` by position.
pub async fn insert_records(
    conn: impl PgExecutor<'_>,
    batch_id: i64,
    ids: &[i64],
    summary: &MatchSummary,
) -> Result<(), sqlx::Error> {
    if summary.rows.is_empty() {
        return Ok(());
    }
    let bill_ids: Vec<&str> = summary.rows.iter().map(|r| r.bill_id.as_str()).collect();
    let amounts: Vec<Option<rust_decimal::Decimal>> =
        summary.rows.iter().map(|r| r.amount).collect();
    let dates: Vec<Option<&str>> = summary.rows.iter().map(|r| r.bill_date.as_deref()).collect();
    let matched: Vec<bool> = summary.rows.iter().map(|r| r.is_matched()).collect();
    let voucher_ids: Vec<Option<i64>> =
        summary.rows.iter().map(|r| r.matched_voucher_id).collect();

    sqlx::query(
        r#"
        INSERT INTO reconciliation_records (
            id, batch_id, bill_id, amount, bill_date, is_matched, matched_voucher_id
        )
        SELECT id, $2, bill_id, amount, bill_date, is_matched, matched_voucher_id
        FROM UNNEST($1::BIGINT[], $3::TEXT[], $4::NUMERIC[], $5::TEXT[], $6::BOOLEAN[], $7::BIGINT[])
            AS t(id, bill_id, amount, bill_date, is_matched, matched_voucher_id)
        "#,
    )
    .bind(ids)
    .bind(batch_id)
    .bind(&bill_ids)
    .bind(&amounts)
    .bind(&dates)
    .bind(&matched)
    .bind(&voucher_ids)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_batches(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReconciliationBatch>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM reconciliation_batches
        WHERE restaurant_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}

pub async fn find_batch(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    batch_id: i64,
) -> Result<Option<ReconciliationBatch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reconciliation_batches WHERE id = $1 AND restaurant_id = $2")
        .bind(batch_id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_records(
    conn: impl PgExecutor<'_>,
    batch_id: i64,
) -> Result<Vec<ReconciliationRecord>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reconciliation_records WHERE batch_id = $1 ORDER BY id")
        .bind(batch_id)
        .fetch_all(conn)
        .await
}
