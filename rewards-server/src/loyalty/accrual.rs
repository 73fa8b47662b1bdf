//! Points accrual
//!
//! `points = floor(amount * rate)`, then bank one credit per full threshold.
//! A single large spend may cross the threshold several times.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::error::{AppError, ErrorCode};
use shared::models::{PointsBalance, Restaurant, VoucherType};

/// Largest spend accepted for one transaction
pub const MAX_SPEND: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// Result of adding points to a counter with a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdOutcome {
    /// Counter value after banking, always `< threshold`
    pub remainder: i64,
    pub credits_earned: i64,
}

/// What one transaction added to a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualDelta {
    pub points_earned: i64,
    pub points_credits_earned: i64,
}

pub fn validate_amount(amount: Decimal) -> Result<(), AppError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            "Spend amount must not be negative",
        ));
    }
    if amount > MAX_SPEND {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("Spend amount exceeds maximum of {MAX_SPEND}"),
        )
        .with_detail("max", MAX_SPEND.to_string()));
    }
    Ok(())
}

/// Rate for a transaction: the named voucher type's override, else the restaurant's.
pub fn effective_rate(restaurant: &Restaurant, override_type: Option<&VoucherType>) -> Decimal {
    override_type
        .and_then(|vt| vt.points_per_currency)
        .unwrap_or(restaurant.points_per_currency)
}

pub fn points_for_spend(amount: Decimal, rate: Decimal) -> Result<i64, AppError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(AppError::with_message(
            ErrorCode::InvalidLoyaltyConfig,
            "Points rate must not be negative",
        ));
    }
    amount
        .checked_mul(rate)
        .and_then(|p| p.floor().to_i64())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidAmount))
}

/// Add `earned` to `current` and bank a credit for every full `threshold`.
pub fn apply_threshold(
    current: i64,
    earned: i64,
    threshold: i32,
) -> Result<ThresholdOutcome, AppError> {
    if threshold < 1 {
        return Err(AppError::with_message(
            ErrorCode::InvalidLoyaltyConfig,
            "Threshold must be at least 1",
        ));
    }
    let threshold = i64::from(threshold);
    let total = current
        .checked_add(earned)
        .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;
    Ok(ThresholdOutcome {
        remainder: total % threshold,
        credits_earned: total / threshold,
    })
}

/// Apply a spend to a balance: points, points credits and lifetime totals.
pub fn accrue_points(
    balance: &mut PointsBalance,
    restaurant: &Restaurant,
    rate: Decimal,
    amount: Decimal,
) -> Result<AccrualDelta, AppError> {
    validate_amount(amount)?;
    let points_earned = points_for_spend(amount, rate)?;
    let outcome = apply_threshold(balance.current_points, points_earned, restaurant.points_threshold)?;

    let out_of_range = || AppError::new(ErrorCode::ValueOutOfRange);
    let points_credits = balance
        .points_credits
        .checked_add(outcome.credits_earned)
        .ok_or_else(out_of_range)?;
    let total_points_earned = balance
        .total_points_earned
        .checked_add(points_earned)
        .ok_or_else(out_of_range)?;
    let total_points_credits_banked = balance
        .total_points_credits_banked
        .checked_add(outcome.credits_earned)
        .ok_or_else(out_of_range)?;
    let total_spent = balance
        .total_spent
        .checked_add(amount)
        .ok_or_else(out_of_range)?;

    balance.current_points = outcome.remainder;
    balance.points_credits = points_credits;
    balance.total_points_earned = total_points_earned;
    balance.total_points_credits_banked = total_points_credits_banked;
    balance.total_spent = total_spent;

    Ok(AccrualDelta {
        points_earned,
        points_credits_earned: outcome.credits_earned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;
    use shared::models::{EarningMode, VoucherCategory};

    fn rands(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_single_crossing() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();

        let delta =
            accrue_points(&mut balance, &restaurant, Decimal::ONE, rands(120_000)).unwrap();

        assert_eq!(delta.points_earned, 1200);
        assert_eq!(delta.points_credits_earned, 1);
        assert_eq!(balance.current_points, 200);
        assert_eq!(balance.points_credits, 1);
        assert_eq!(balance.total_points_earned, 1200);
        assert_eq!(balance.total_spent, rands(120_000));
    }

    #[test]
    fn test_multiple_crossings_in_one_spend() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        balance.current_points = 900;

        let delta =
            accrue_points(&mut balance, &restaurant, Decimal::ONE, rands(350_000)).unwrap();

        // 900 + 3500 = 4400 -> 4 credits, 400 left
        assert_eq!(delta.points_credits_earned, 4);
        assert_eq!(balance.current_points, 400);
        assert_eq!(balance.points_credits, 4);
        assert_eq!(balance.total_points_credits_banked, 4);
    }

    #[test]
    fn test_points_are_floored() {
        assert_eq!(points_for_spend(rands(99_99), Decimal::ONE).unwrap(), 99);
        assert_eq!(points_for_spend(rands(10_00), Decimal::new(15, 1)).unwrap(), 15);
        assert_eq!(points_for_spend(rands(1_33), Decimal::new(15, 1)).unwrap(), 1);
        assert_eq!(points_for_spend(Decimal::ZERO, Decimal::TEN).unwrap(), 0);
    }

    #[test]
    fn test_remainder_stays_below_threshold() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        let mut total_points = 0i64;
        for cents in [12_345, 99_999, 100_000, 1, 250_050, 0, 7_77] {
            let delta =
                accrue_points(&mut balance, &restaurant, Decimal::ONE, rands(cents)).unwrap();
            total_points += delta.points_earned;
            assert!(balance.current_points < i64::from(restaurant.points_threshold));
        }
        assert_eq!(
            balance.points_credits,
            total_points / i64::from(restaurant.points_threshold)
        );
    }

    #[test]
    fn test_negative_amount_rejected_without_mutation() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        let err =
            accrue_points(&mut balance, &restaurant, Decimal::ONE, rands(-100)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
        assert_eq!(balance.total_spent, Decimal::ZERO);
    }

    #[test]
    fn test_amount_above_limit_rejected() {
        assert!(validate_amount(MAX_SPEND).is_ok());
        let err = validate_amount(MAX_SPEND + Decimal::ONE).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn test_zero_threshold_is_config_error() {
        let err = apply_threshold(0, 10, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLoyaltyConfig);
    }

    #[test]
    fn test_voucher_type_rate_override() {
        let restaurant = fixtures::restaurant();
        let mut vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 1);
        assert_eq!(effective_rate(&restaurant, Some(&vt)), Decimal::ONE);

        vt.points_per_currency = Some(Decimal::TWO);
        assert_eq!(effective_rate(&restaurant, Some(&vt)), Decimal::TWO);
        assert_eq!(effective_rate(&restaurant, None), Decimal::ONE);
    }

    #[test]
    fn test_lifetime_total_overflow_leaves_balance_untouched() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        balance.total_points_earned = i64::MAX - 10;
        let before = balance.clone();

        let err = accrue_points(&mut balance, &restaurant, Decimal::ONE, rands(120_000))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(balance.current_points, before.current_points);
        assert_eq!(balance.points_credits, before.points_credits);
        assert_eq!(balance.total_spent, before.total_spent);
    }
}
