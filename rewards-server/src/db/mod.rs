//! Database access layer
//!
//! One module per table group. Functions take `impl PgExecutor` so the same
//! query runs against the pool or inside a service transaction (`&mut *tx`).

pub mod activity;
pub mod balances;
pub mod campaigns;
pub mod deletions;
pub mod invitations;
pub mod otp;
pub mod portal_users;
pub mod reconciliation;
pub mod restaurants;
pub mod transactions;
pub mod users;
pub mod voucher_types;
pub mod vouchers;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Clamp a client-supplied `(limit, offset)` pair
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        assert_eq!(page(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page(Some(0), Some(-5)), (1, 0));
        assert_eq!(page(Some(10_000), Some(40)), (MAX_PAGE_SIZE, 40));
    }
}
