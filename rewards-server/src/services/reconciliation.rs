//! Reconciliation: match uploaded POS bills against redeemed vouchers

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    ReconciliationBatch, ReconciliationBatchDetail, ReconciliationUpload, Voucher,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::loyalty::reconciliation::{lookup_keys, match_rows};
use crate::validation::{MAX_NAME_LEN, MAX_RECONCILIATION_ROWS, validate_required_text};

fn validate_upload(upload: &ReconciliationUpload) -> Result<(), AppError> {
    validate_required_text(&upload.file_name, "file_name", MAX_NAME_LEN)?;
    if upload.rows.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyUpload));
    }
    if upload.rows.len() > MAX_RECONCILIATION_ROWS {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("At most {MAX_RECONCILIATION_ROWS} rows per upload"),
        )
        .with_detail("rows", upload.rows.len()));
    }
    Ok(())
}

/// Store the upload as a batch and mark which rows match a voucher.
pub async fn upload(
    pool: &PgPool,
    restaurant_id: i64,
    uploaded_by: i64,
    upload: &ReconciliationUpload,
) -> ServiceResult<ReconciliationBatchDetail> {
    validate_upload(upload)?;

    let now = now_millis();
    let mut tx = pool.begin().await?;

    let keys = lookup_keys(&upload.rows);
    let found: HashMap<String, i64> = db::vouchers::ids_by_bill(&mut *tx, restaurant_id, &keys)
        .await?
        .into_iter()
        .collect();
    let summary = match_rows(&upload.rows, &found);

    let batch = ReconciliationBatch {
        id: snowflake_id(),
        restaurant_id,
        file_name: upload.file_name.trim().to_string(),
        uploaded_by: Some(uploaded_by),
        total_records: summary.total(),
        matched_records: summary.matched,
        unmatched_records: summary.unmatched,
        created_at: now,
    };
    db::reconciliation::insert_batch(&mut *tx, &batch).await?;

    let ids: Vec<i64> = summary.rows.iter().map(|_| snowflake_id()).collect();
    db::reconciliation::insert_records(&mut *tx, batch.id, &ids, &summary).await?;

    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(uploaded_by),
        "reconciliation_uploaded",
        Some(&serde_json::json!({
            "batch_id": batch.id,
            "file_name": batch.file_name,
            "matched": batch.matched_records,
            "unmatched": batch.unmatched_records,
        })),
        now,
    )
    .await?;

    let records = db::reconciliation::list_records(&mut *tx, batch.id).await?;
    tx.commit().await?;

    tracing::info!(
        batch_id = batch.id,
        restaurant_id,
        total = batch.total_records,
        matched = batch.matched_records,
        "Reconciliation batch stored"
    );
    Ok(ReconciliationBatchDetail { batch, records })
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<ReconciliationBatch>> {
    Ok(db::reconciliation::list_batches(pool, restaurant_id, limit, offset).await?)
}

pub async fn detail(
    pool: &PgPool,
    restaurant_id: i64,
    batch_id: i64,
) -> ServiceResult<ReconciliationBatchDetail> {
    let batch = db::reconciliation::find_batch(pool, restaurant_id, batch_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BatchNotFound))?;
    let records = db::reconciliation::list_records(pool, batch.id).await?;
    Ok(ReconciliationBatchDetail { batch, records })
}

/// Redeemed vouchers whose bill never showed up in an upload
pub async fn unreconciled(
    pool: &PgPool,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<Voucher>> {
    Ok(db::vouchers::unreconciled(pool, restaurant_id, limit, offset).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ReconciliationRow;

    fn upload(rows: usize) -> ReconciliationUpload {
        ReconciliationUpload {
            file_name: "march.csv".into(),
            rows: (0..rows)
                .map(|i| ReconciliationRow {
                    bill_id: format!("B{i}"),
                    amount: None,
                    date: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload(&upload(3)).is_ok());
        assert_eq!(validate_upload(&upload(0)).unwrap_err().code, ErrorCode::EmptyUpload);
        assert_eq!(
            validate_upload(&upload(MAX_RECONCILIATION_ROWS + 1)).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );

        let mut nameless = upload(1);
        nameless.file_name = "  ".into();
        assert_eq!(
            validate_upload(&nameless).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
