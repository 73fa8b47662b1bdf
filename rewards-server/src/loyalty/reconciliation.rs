//! Bill-to-voucher matching for reconciliation uploads

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::models::ReconciliationRow;

/// One row after matching
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRow {
    pub bill_id: String,
    pub amount: Option<Decimal>,
    pub bill_date: Option<String>,
    pub matched_voucher_id: Option<i64>,
}

impl MatchedRow {
    pub fn is_matched(&self) -> bool {
        self.matched_voucher_id.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchSummary {
    pub rows: Vec<MatchedRow>,
    pub matched: i32,
    pub unmatched: i32,
}

impl MatchSummary {
    pub fn total(&self) -> i32 {
        self.matched + self.unmatched
    }
}

/// Trimmed bill ids worth looking up; blanks are dropped.
pub fn lookup_keys(rows: &[ReconciliationRow]) -> Vec<String> {
    let mut keys: Vec<String> = rows
        .iter()
        .map(|r| r.bill_id.trim())
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Match each row against `voucher_by_bill` (bill id -> voucher id).
/// Blank bill ids never match.
pub fn match_rows(rows: &[ReconciliationRow], voucher_by_bill: &HashMap<String, i64>) -> MatchSummary {
    let mut summary = MatchSummary::default();
    for row in rows {
        let bill_id = row.bill_id.trim();
        let matched_voucher_id = if bill_id.is_empty() {
            None
        } else {
            voucher_by_bill.get(bill_id).copied()
        };
        if matched_voucher_id.is_some() {
            summary.matched += 1;
        } else {
            summary.unmatched += 1;
        }
        summary.rows.push(MatchedRow {
            bill_id: bill_id.to_string(),
            amount: row.amount,
            bill_date: row.date.as_ref().map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            matched_voucher_id,
        });
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bill_id: &str) -> ReconciliationRow {
        ReconciliationRow {
            bill_id: bill_id.into(),
            amount: Some(Decimal::new(25_000, 2)),
            date: Some("2024-03-01".into()),
        }
    }

    #[test]
    fn test_match_rows() {
        let vouchers = HashMap::from([("B-100".to_string(), 1), ("B-200".to_string(), 2)]);
        let rows = vec![row("B-100"), row(" B-200 "), row("B-300"), row("   ")];

        let summary = match_rows(&rows, &vouchers);

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched, 2);
        assert_eq!(summary.rows[1].bill_id, "B-200");
        assert_eq!(summary.rows[1].matched_voucher_id, Some(2));
        assert!(!summary.rows[2].is_matched());
        // Blank bill id is kept as an unmatched row
        assert_eq!(summary.rows[3].bill_id, "");
        assert!(!summary.rows[3].is_matched());
    }

    #[test]
    fn test_lookup_keys_skip_blanks_and_duplicates() {
        let rows = vec![row("B-2"), row(""), row("B-1"), row(" B-2")];
        assert_eq!(lookup_keys(&rows), vec!["B-1".to_string(), "B-2".to_string()]);
    }

    #[test]
    fn test_blank_date_dropped() {
        let mut r = row("B-1");
        r.date = Some("  ".into());
        let summary = match_rows(&[r], &HashMap::new());
        assert_eq!(summary.rows[0].bill_date, None);
        assert_eq!(summary.unmatched, 1);
    }
}
