//! Restaurant & Branch Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether loyalty accrual / voucher issuance is organization-wide or per branch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "scope_level", rename_all = "snake_case"))]
pub enum ScopeLevel {
    #[default]
    Organization,
    Branch,
}

/// Restaurant entity (tenant root, carries loyalty configuration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Points earned per currency unit spent
    pub points_per_currency: Decimal,
    /// Points needed to bank one points credit
    pub points_threshold: i32,
    /// Visits needed to bank one visit credit
    pub visit_threshold: i32,
    /// Minimum spend for a transaction to count as a visit
    pub visit_min_spend: Decimal,
    /// Default voucher validity when a voucher type has none
    pub voucher_validity_days: i32,
    pub loyalty_scope: ScopeLevel,
    pub voucher_scope: ScopeLevel,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Update restaurant configuration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub points_per_currency: Option<Decimal>,
    pub points_threshold: Option<i32>,
    pub visit_threshold: Option<i32>,
    pub visit_min_spend: Option<Decimal>,
    pub voucher_validity_days: Option<i32>,
    pub loyalty_scope: Option<ScopeLevel>,
    pub voucher_scope: Option<ScopeLevel>,
}

/// Branch entity (location under a restaurant)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Update branch payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}
