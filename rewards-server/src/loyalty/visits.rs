//! Visit counting
//!
//! A qualifying spend adds one visit; every `visit_threshold` visits banks a
//! visit credit. Runs in the same database transaction as points accrual.

use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{PointsBalance, Restaurant};

use super::accrual::apply_threshold;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitDelta {
    pub visit_counted: bool,
    pub visit_credits_earned: i64,
}

pub fn qualifies_as_visit(amount: Decimal, min_spend: Decimal) -> bool {
    amount >= min_spend
}

pub fn record_visit(
    balance: &mut PointsBalance,
    restaurant: &Restaurant,
    amount: Decimal,
) -> Result<VisitDelta, AppError> {
    if !qualifies_as_visit(amount, restaurant.visit_min_spend) {
        return Ok(VisitDelta {
            visit_counted: false,
            visit_credits_earned: 0,
        });
    }

    let outcome = apply_threshold(balance.current_visits, 1, restaurant.visit_threshold)?;
    balance.current_visits = outcome.remainder;
    balance.visit_credits += outcome.credits_earned;
    balance.total_visits += 1;
    balance.total_visit_credits_banked += outcome.credits_earned;

    Ok(VisitDelta {
        visit_counted: true,
        visit_credits_earned: outcome.credits_earned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;

    #[test]
    fn test_below_min_spend_is_not_a_visit() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        let delta = record_visit(&mut balance, &restaurant, Decimal::new(4999, 2)).unwrap();
        assert!(!delta.visit_counted);
        assert_eq!(balance.current_visits, 0);
        assert_eq!(balance.total_visits, 0);
    }

    #[test]
    fn test_min_spend_is_inclusive() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        let delta = record_visit(&mut balance, &restaurant, Decimal::new(5000, 2)).unwrap();
        assert!(delta.visit_counted);
        assert_eq!(balance.current_visits, 1);
    }

    #[test]
    fn test_threshold_crossing_banks_credit() {
        let restaurant = fixtures::restaurant();
        let mut balance = fixtures::balance();
        balance.current_visits = 4;

        let delta = record_visit(&mut balance, &restaurant, Decimal::new(10_000, 2)).unwrap();

        assert_eq!(delta.visit_credits_earned, 1);
        assert_eq!(balance.current_visits, 0);
        assert_eq!(balance.visit_credits, 1);
        assert_eq!(balance.total_visits, 1);
        assert_eq!(balance.total_visit_credits_banked, 1);
    }

    #[test]
    fn test_threshold_of_one_credits_every_visit() {
        let mut restaurant = fixtures::restaurant();
        restaurant.visit_threshold = 1;
        restaurant.visit_min_spend = Decimal::ZERO;
        let mut balance = fixtures::balance();
        for _ in 0..3 {
            record_visit(&mut balance, &restaurant, Decimal::ZERO).unwrap();
        }
        assert_eq!(balance.visit_credits, 3);
        assert_eq!(balance.current_visits, 0);
    }
}
