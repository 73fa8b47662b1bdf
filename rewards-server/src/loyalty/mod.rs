//! Loyalty rules
//!
//! Pure functions over the shared models: no I/O, no clock reads. Services
//! load rows under lock, call into here, then persist the mutated values.

pub mod accrual;
pub mod codes;
pub mod issuance;
pub mod reconciliation;
pub mod redemption;
pub mod visits;

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;
    use shared::models::{
        EarningMode, PointsBalance, RedemptionScope, Restaurant, ScopeLevel, Voucher,
        VoucherCategory, VoucherType,
    };

    pub fn restaurant() -> Restaurant {
        Restaurant {
            id: 1,
            name: "Nando's Rosebank".into(),
            email: None,
            phone: None,
            points_per_currency: Decimal::ONE,
            points_threshold: 1000,
            visit_threshold: 5,
            visit_min_spend: Decimal::new(5000, 2),
            voucher_validity_days: 30,
            loyalty_scope: ScopeLevel::Organization,
            voucher_scope: ScopeLevel::Organization,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn balance() -> PointsBalance {
        PointsBalance {
            id: 10,
            diner_id: 7,
            restaurant_id: 1,
            branch_id: None,
            current_points: 0,
            current_visits: 0,
            points_credits: 0,
            visit_credits: 0,
            total_points_earned: 0,
            total_visits: 0,
            total_spent: Decimal::ZERO,
            total_points_credits_banked: 0,
            total_visit_credits_banked: 0,
            total_vouchers_generated: 0,
            total_voucher_credits_earned: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn voucher_type(category: VoucherCategory, mode: EarningMode, cost: i32) -> VoucherType {
        VoucherType {
            id: 20,
            restaurant_id: 1,
            name: "Free dessert".into(),
            description: None,
            category,
            value: None,
            free_item_name: Some("Dessert".into()),
            earning_mode: mode,
            credits_cost: cost,
            validity_days: None,
            points_per_currency: None,
            is_active: true,
            redemption_scope: RedemptionScope::AllBranches,
            redeemable_branch_ids: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn voucher(expiry_date: i64) -> Voucher {
        Voucher {
            id: 30,
            restaurant_id: 1,
            diner_id: 7,
            branch_id: None,
            voucher_type_id: 20,
            code: "ABCD-EFGH".into(),
            name: "Free dessert".into(),
            category: VoucherCategory::FreeItem,
            earning_mode: EarningMode::Points,
            value: None,
            free_item_name: Some("Dessert".into()),
            credits_spent: 1,
            expiry_date,
            is_redeemed: false,
            redeemed_at: None,
            redeemed_branch_id: None,
            redeemed_by: None,
            bill_id: None,
            created_at: 0,
        }
    }
}
