//! Presentation and redemption checks
//!
//! Voucher lifecycle: `issued -> selected -> redeemed`, or expired from either
//! of the first two. Selection stamps a short-lived code on the diner; staff
//! redeem by that code. Checks run in a fixed order so the first failing rule
//! decides the reported reason.

use shared::error::{AppError, ErrorCode};
use shared::models::{RedemptionScope, Restaurant, ScopeLevel, Voucher, VoucherType};

/// A diner may only select one of their own live vouchers.
pub fn check_selectable(voucher: &Voucher, diner_id: i64, now: i64) -> Result<(), AppError> {
    if voucher.diner_id != diner_id {
        return Err(AppError::new(ErrorCode::VoucherNotFound));
    }
    check_unredeemed(voucher)?;
    check_not_expired(voucher, now)
}

pub fn presentation_expires_at(set_at: i64, ttl_millis: i64) -> i64 {
    set_at + ttl_millis
}

/// The presented code must have been stamped within the live window.
pub fn check_presentation_window(
    set_at: Option<i64>,
    now: i64,
    ttl_millis: i64,
) -> Result<(), AppError> {
    let Some(set_at) = set_at else {
        return Err(AppError::new(ErrorCode::PresentationCodeNotFound));
    };
    if now > presentation_expires_at(set_at, ttl_millis) {
        return Err(AppError::new(ErrorCode::PresentationCodeExpired));
    }
    Ok(())
}

fn check_unredeemed(voucher: &Voucher) -> Result<(), AppError> {
    if voucher.is_redeemed {
        let mut err = AppError::new(ErrorCode::VoucherAlreadyRedeemed);
        if let Some(at) = voucher.redeemed_at {
            err = err.with_detail("redeemed_at", at);
        }
        return Err(err);
    }
    Ok(())
}

fn check_not_expired(voucher: &Voucher, now: i64) -> Result<(), AppError> {
    if voucher.expiry_date < now {
        return Err(
            AppError::new(ErrorCode::VoucherExpired).with_detail("expiry_date", voucher.expiry_date)
        );
    }
    Ok(())
}

/// Branch rules: a branch-scoped restaurant only honours a voucher at the
/// branch it was issued for; a `specific_branches` type only at its listed
/// branches.
pub fn check_branch(
    voucher: &Voucher,
    restaurant: &Restaurant,
    vt: &VoucherType,
    branch_id: Option<i64>,
) -> Result<(), AppError> {
    let wrong_branch = || {
        let err = AppError::new(ErrorCode::VoucherWrongBranch);
        match branch_id {
            Some(id) => err.with_detail("branch_id", id),
            None => err,
        }
    };

    if restaurant.voucher_scope == ScopeLevel::Branch
        && let Some(issued_at) = voucher.branch_id
        && branch_id != Some(issued_at)
    {
        return Err(wrong_branch());
    }

    if vt.redemption_scope == RedemptionScope::SpecificBranches {
        match branch_id {
            Some(id) if vt.redeemable_branch_ids.contains(&id) => {}
            _ => return Err(wrong_branch()),
        }
    }
    Ok(())
}

/// Full redemption check for a voucher resolved from a presented code.
pub fn check_redeemable(
    voucher: &Voucher,
    restaurant: &Restaurant,
    vt: &VoucherType,
    branch_id: Option<i64>,
    now: i64,
) -> Result<(), AppError> {
    if voucher.restaurant_id != restaurant.id {
        return Err(AppError::new(ErrorCode::VoucherNotFound));
    }
    check_unredeemed(voucher)?;
    check_not_expired(voucher, now)?;
    check_branch(voucher, restaurant, vt, branch_id)
}

/// What a presented code points at.
#[derive(Debug, Clone)]
pub enum PresentedCode {
    /// Code currently stamped on a diner, with the time it was stamped
    Live { set_at: Option<i64>, voucher: Voucher },
    /// Code no longer on any diner, but a voucher was redeemed with it
    Spent(Voucher),
}

impl PresentedCode {
    pub fn voucher(&self) -> &Voucher {
        match self {
            Self::Live { voucher, .. } | Self::Spent(voucher) => voucher,
        }
    }
}

/// Check a presented code end to end: window (live codes only), then the
/// voucher rules. A spent code reports the original redemption as a conflict.
pub fn check_presented(
    presented: &PresentedCode,
    restaurant: &Restaurant,
    vt: &VoucherType,
    branch_id: Option<i64>,
    now: i64,
    ttl_millis: i64,
) -> Result<(), AppError> {
    if let PresentedCode::Live { set_at, .. } = presented {
        check_presentation_window(*set_at, now, ttl_millis)?;
    }
    check_redeemable(presented.voucher(), restaurant, vt, branch_id, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;
    use shared::models::{EarningMode, VoucherCategory};

    const NOW: i64 = 1_700_000_000_000;
    const TTL: i64 = 15 * 60 * 1000;

    fn vt() -> VoucherType {
        fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 1)
    }

    #[test]
    fn test_live_voucher_is_redeemable() {
        let voucher = fixtures::voucher(NOW + 1);
        assert!(check_redeemable(&voucher, &fixtures::restaurant(), &vt(), None, NOW).is_ok());
    }

    #[test]
    fn test_expiry_boundary() {
        let restaurant = fixtures::restaurant();
        assert!(check_redeemable(&fixtures::voucher(NOW), &restaurant, &vt(), None, NOW).is_ok());
        let err = check_redeemable(&fixtures::voucher(NOW - 1), &restaurant, &vt(), None, NOW)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherExpired);
    }

    #[test]
    fn test_redeemed_reports_conflict_before_expiry() {
        let mut voucher = fixtures::voucher(NOW - 1);
        voucher.is_redeemed = true;
        voucher.redeemed_at = Some(NOW - 5_000);
        let err =
            check_redeemable(&voucher, &fixtures::restaurant(), &vt(), None, NOW).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherAlreadyRedeemed);
        assert_eq!(err.details.unwrap()["redeemed_at"], NOW - 5_000);
    }

    #[test]
    fn test_other_restaurant_voucher_not_found() {
        let mut restaurant = fixtures::restaurant();
        restaurant.id = 99;
        let err = check_redeemable(&fixtures::voucher(NOW + 1), &restaurant, &vt(), None, NOW)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotFound);
    }

    #[test]
    fn test_specific_branches_scope() {
        let restaurant = fixtures::restaurant();
        let voucher = fixtures::voucher(NOW + 1);
        let mut vt = vt();
        vt.redemption_scope = RedemptionScope::SpecificBranches;
        vt.redeemable_branch_ids = vec![100];

        assert!(check_redeemable(&voucher, &restaurant, &vt, Some(100), NOW).is_ok());
        let err = check_redeemable(&voucher, &restaurant, &vt, Some(200), NOW).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherWrongBranch);
        let err = check_redeemable(&voucher, &restaurant, &vt, None, NOW).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherWrongBranch);
    }

    #[test]
    fn test_branch_scoped_restaurant() {
        let mut restaurant = fixtures::restaurant();
        restaurant.voucher_scope = ScopeLevel::Branch;
        let mut voucher = fixtures::voucher(NOW + 1);
        voucher.branch_id = Some(100);

        assert!(check_branch(&voucher, &restaurant, &vt(), Some(100)).is_ok());
        assert_eq!(
            check_branch(&voucher, &restaurant, &vt(), Some(101))
                .unwrap_err()
                .code,
            ErrorCode::VoucherWrongBranch
        );

        // Organisation-wide vouchers are honoured anywhere
        voucher.branch_id = None;
        assert!(check_branch(&voucher, &restaurant, &vt(), Some(101)).is_ok());
    }

    #[test]
    fn test_presentation_window() {
        assert!(check_presentation_window(Some(NOW - TTL), NOW, TTL).is_ok());
        assert_eq!(
            check_presentation_window(Some(NOW - TTL - 1), NOW, TTL)
                .unwrap_err()
                .code,
            ErrorCode::PresentationCodeExpired
        );
        assert_eq!(
            check_presentation_window(None, NOW, TTL).unwrap_err().code,
            ErrorCode::PresentationCodeNotFound
        );
    }

    #[test]
    fn test_selectable() {
        let voucher = fixtures::voucher(NOW + 1);
        assert!(check_selectable(&voucher, 7, NOW).is_ok());
        assert_eq!(
            check_selectable(&voucher, 8, NOW).unwrap_err().code,
            ErrorCode::VoucherNotFound
        );
        assert_eq!(
            check_selectable(&fixtures::voucher(NOW - 1), 7, NOW)
                .unwrap_err()
                .code,
            ErrorCode::VoucherExpired
        );
    }

    #[test]
    fn test_presented_live_code() {
        let restaurant = fixtures::restaurant();
        let live = PresentedCode::Live {
            set_at: Some(NOW - 1_000),
            voucher: fixtures::voucher(NOW + 1),
        };
        assert!(check_presented(&live, &restaurant, &vt(), None, NOW, TTL).is_ok());

        let stale = PresentedCode::Live {
            set_at: Some(NOW - TTL - 1),
            voucher: fixtures::voucher(NOW + 1),
        };
        assert_eq!(
            check_presented(&stale, &restaurant, &vt(), None, NOW, TTL)
                .unwrap_err()
                .code,
            ErrorCode::PresentationCodeExpired
        );
    }

    #[test]
    fn test_second_redeem_of_spent_code_conflicts() {
        let restaurant = fixtures::restaurant();
        let first_redeemed_at = NOW - 2 * TTL;
        let mut voucher = fixtures::voucher(NOW + 1);
        voucher.is_redeemed = true;
        voucher.redeemed_at = Some(first_redeemed_at);

        // Long past the presentation window, still a conflict, not an expiry
        let spent = PresentedCode::Spent(voucher);
        let err = check_presented(&spent, &restaurant, &vt(), None, NOW, TTL).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherAlreadyRedeemed);
        assert_eq!(err.details.unwrap()["redeemed_at"], first_redeemed_at);
        assert_eq!(spent.voucher().redeemed_at, Some(first_redeemed_at));
    }
}
