//! Points Balance & Transaction Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Diner progress towards credits at one restaurant (or one branch, when
/// loyalty is branch-scoped)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PointsBalance {
    pub id: i64,
    pub diner_id: i64,
    pub restaurant_id: i64,
    pub branch_id: Option<i64>,
    /// Points towards the next credit, always below the threshold after crediting
    pub current_points: i64,
    /// Visits towards the next credit, always below the threshold after crediting
    pub current_visits: i64,
    /// Banked credits from points, spendable on points vouchers
    pub points_credits: i64,
    /// Banked credits from visits, spendable on visit vouchers
    pub visit_credits: i64,
    pub total_points_earned: i64,
    pub total_visits: i64,
    pub total_spent: Decimal,
    pub total_points_credits_banked: i64,
    pub total_visit_credits_banked: i64,
    pub total_vouchers_generated: i64,
    /// Credits converted into vouchers over the lifetime of the balance
    pub total_voucher_credits_earned: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Balance joined with restaurant/branch names (diner dashboard)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PointsBalanceDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub balance: PointsBalance,
    pub restaurant_name: String,
    pub branch_name: Option<String>,
    pub points_threshold: i32,
    pub visit_threshold: i32,
}

/// Balance joined with the diner identity (staff dashboard)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DinerBalanceRow {
    pub diner_id: i64,
    pub diner_name: Option<String>,
    pub diner_phone: Option<String>,
    pub branch_id: Option<i64>,
    pub current_points: i64,
    pub current_visits: i64,
    pub points_credits: i64,
    pub visit_credits: i64,
    pub total_spent: Decimal,
    pub updated_at: i64,
}

/// Immutable spend log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: i64,
    pub diner_id: i64,
    pub restaurant_id: i64,
    pub branch_id: Option<i64>,
    pub amount_spent: Decimal,
    pub points_earned: i64,
    pub visit_counted: bool,
    pub points_credits_earned: i64,
    pub visit_credits_earned: i64,
    pub bill_id: Option<String>,
    pub voucher_type_id: Option<i64>,
    pub captured_by: Option<i64>,
    pub created_at: i64,
}

/// Capture a spend event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub diner_id: i64,
    pub restaurant_id: i64,
    pub branch_id: Option<i64>,
    pub amount_spent: Decimal,
    pub bill_id: Option<String>,
    /// Voucher type whose points rate overrides the restaurant rate
    pub voucher_type_id: Option<i64>,
}

/// Outcome of capturing a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualResult {
    pub transaction: Transaction,
    pub balance: PointsBalance,
    /// Registration voucher issued because this was the diner's first visit
    pub welcome_voucher: Option<super::voucher::Voucher>,
}
