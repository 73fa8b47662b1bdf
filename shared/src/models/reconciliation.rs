//! Reconciliation Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One uploaded POS bill list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReconciliationBatch {
    pub id: i64,
    pub restaurant_id: i64,
    pub file_name: String,
    pub uploaded_by: Option<i64>,
    pub total_records: i32,
    pub matched_records: i32,
    pub unmatched_records: i32,
    pub created_at: i64,
}

/// One bill row of a batch and its match result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReconciliationRecord {
    pub id: i64,
    pub batch_id: i64,
    pub bill_id: String,
    pub amount: Option<Decimal>,
    pub bill_date: Option<String>,
    pub is_matched: bool,
    pub matched_voucher_id: Option<i64>,
}

/// Pre-split CSV row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub bill_id: String,
    pub amount: Option<Decimal>,
    pub date: Option<String>,
}

/// Upload payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationUpload {
    pub file_name: String,
    pub rows: Vec<ReconciliationRow>,
}

/// Batch with its rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationBatchDetail {
    #[serde(flatten)]
    pub batch: ReconciliationBatch,
    pub records: Vec<ReconciliationRecord>,
}
