//! Voucher Type & Voucher Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reward category of a voucher type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "voucher_category", rename_all = "snake_case")
)]
pub enum VoucherCategory {
    /// Fixed currency amount off the bill
    RandValue,
    /// Percentage off the bill
    Percentage,
    /// A named free item
    FreeItem,
    /// One-per-lifetime welcome voucher
    Registration,
}

/// Which banked credits a voucher type consumes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "earning_mode", rename_all = "snake_case"))]
pub enum EarningMode {
    Points,
    Visits,
}

/// Where a voucher of this type may be redeemed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "redemption_scope", rename_all = "snake_case")
)]
pub enum RedemptionScope {
    #[default]
    AllBranches,
    SpecificBranches,
}

/// Restaurant-defined reward template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VoucherType {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: VoucherCategory,
    /// Rand amount or percentage, depending on category
    pub value: Option<Decimal>,
    pub free_item_name: Option<String>,
    pub earning_mode: EarningMode,
    pub credits_cost: i32,
    pub validity_days: Option<i32>,
    /// Overrides the restaurant points rate for transactions that name this type
    pub points_per_currency: Option<Decimal>,
    pub is_active: bool,
    pub redemption_scope: RedemptionScope,
    pub redeemable_branch_ids: Vec<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create voucher type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherTypeCreate {
    pub name: String,
    pub description: Option<String>,
    pub category: VoucherCategory,
    pub value: Option<Decimal>,
    pub free_item_name: Option<String>,
    pub earning_mode: EarningMode,
    #[serde(default)]
    pub credits_cost: i32,
    pub validity_days: Option<i32>,
    pub points_per_currency: Option<Decimal>,
    #[serde(default)]
    pub redemption_scope: RedemptionScope,
    #[serde(default)]
    pub redeemable_branch_ids: Vec<i64>,
}

/// Update voucher type payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoucherTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub free_item_name: Option<String>,
    pub credits_cost: Option<i32>,
    pub validity_days: Option<i32>,
    pub points_per_currency: Option<Decimal>,
    pub is_active: Option<bool>,
    pub redemption_scope: Option<RedemptionScope>,
    pub redeemable_branch_ids: Option<Vec<i64>>,
}

/// Issued, redeemable voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Voucher {
    pub id: i64,
    pub restaurant_id: i64,
    pub diner_id: i64,
    pub branch_id: Option<i64>,
    pub voucher_type_id: i64,
    /// Long-lived code, unique per restaurant
    pub code: String,
    pub name: String,
    pub category: VoucherCategory,
    pub earning_mode: EarningMode,
    pub value: Option<Decimal>,
    pub free_item_name: Option<String>,
    pub credits_spent: i32,
    pub expiry_date: i64,
    pub is_redeemed: bool,
    pub redeemed_at: Option<i64>,
    pub redeemed_branch_id: Option<i64>,
    pub redeemed_by: Option<i64>,
    pub bill_id: Option<String>,
    pub created_at: i64,
}

/// Derived lifecycle state, evaluated at request time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Active,
    Redeemed,
    Expired,
}

impl Voucher {
    pub fn status_at(&self, now: i64) -> VoucherStatus {
        if self.is_redeemed {
            VoucherStatus::Redeemed
        } else if self.expiry_date < now {
            VoucherStatus::Expired
        } else {
            VoucherStatus::Active
        }
    }
}

/// Exchange banked credits for a voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemCreditRequest {
    pub voucher_type_id: i64,
    pub branch_id: Option<i64>,
}

/// Short-lived code shown to staff at the point of sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentedVoucher {
    pub voucher: Voucher,
    pub presentation_code: String,
    pub expires_at: i64,
}

/// Staff submits a presented code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemVoucherRequest {
    pub code: String,
    pub bill_id: Option<String>,
    pub branch_id: Option<i64>,
}

/// Look up a presented code without redeeming it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionPreview {
    pub voucher: Voucher,
    pub diner_name: Option<String>,
    pub redeemable: bool,
    /// Error code explaining why the voucher cannot be redeemed
    pub reason: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(is_redeemed: bool, expiry_date: i64) -> Voucher {
        Voucher {
            id: 1,
            restaurant_id: 1,
            diner_id: 1,
            branch_id: None,
            voucher_type_id: 1,
            code: "ABCD-EFGH".into(),
            name: "Free coffee".into(),
            category: VoucherCategory::FreeItem,
            earning_mode: EarningMode::Visits,
            value: None,
            free_item_name: Some("Coffee".into()),
            credits_spent: 1,
            expiry_date,
            is_redeemed,
            redeemed_at: None,
            redeemed_branch_id: None,
            redeemed_by: None,
            bill_id: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_status_at() {
        assert_eq!(voucher(false, 2000).status_at(1000), VoucherStatus::Active);
        assert_eq!(voucher(false, 1000).status_at(1000), VoucherStatus::Active);
        assert_eq!(voucher(false, 999).status_at(1000), VoucherStatus::Expired);
        // Redeemed wins over expired
        assert_eq!(voucher(true, 999).status_at(1000), VoucherStatus::Redeemed);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&VoucherCategory::RandValue).unwrap(),
            "\"rand_value\""
        );
        assert_eq!(
            serde_json::to_string(&RedemptionScope::SpecificBranches).unwrap(),
            "\"specific_branches\""
        );
        let mode: EarningMode = serde_json::from_str("\"visits\"").unwrap();
        assert_eq!(mode, EarningMode::Visits);
    }

    #[test]
    fn test_voucher_type_create_defaults() {
        let json = r#"{
            "name": "Welcome",
            "description": null,
            "category": "registration",
            "value": null,
            "free_item_name": null,
            "earning_mode": "points",
            "validity_days": 30,
            "points_per_currency": null
        }"#;
        let create: VoucherTypeCreate = serde_json::from_str(json).unwrap();
        assert_eq!(create.credits_cost, 0);
        assert_eq!(create.redemption_scope, RedemptionScope::AllBranches);
        assert!(create.redeemable_branch_ids.is_empty());
    }
}
