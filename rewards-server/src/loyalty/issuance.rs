//! Voucher issuance rules
//!
//! Converting banked credits into a voucher, and validating voucher type
//! definitions before they are stored.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    EarningMode, PointsBalance, RedemptionScope, Restaurant, VoucherCategory, VoucherType,
    VoucherTypeCreate, VoucherTypeUpdate,
};
use shared::util::DAY_MILLIS;

use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

/// The type must belong to the restaurant and be active.
pub fn check_voucher_type(vt: &VoucherType, restaurant_id: i64) -> Result<(), AppError> {
    if vt.restaurant_id != restaurant_id {
        return Err(AppError::new(ErrorCode::VoucherTypeNotFound));
    }
    if !vt.is_active {
        return Err(AppError::new(ErrorCode::VoucherTypeInactive));
    }
    Ok(())
}

pub fn available_credits(balance: &PointsBalance, mode: EarningMode) -> i64 {
    match mode {
        EarningMode::Points => balance.points_credits,
        EarningMode::Visits => balance.visit_credits,
    }
}

/// Debit the type's cost from the matching credit pool and bump the issuance
/// counters. Leaves the balance untouched on error.
pub fn debit_credits(balance: &mut PointsBalance, vt: &VoucherType) -> Result<(), AppError> {
    let cost = i64::from(vt.credits_cost.max(0));
    let available = available_credits(balance, vt.earning_mode);
    if available < cost {
        return Err(AppError::new(ErrorCode::InsufficientCredits)
            .with_detail("required", cost)
            .with_detail("available", available));
    }

    match vt.earning_mode {
        EarningMode::Points => balance.points_credits -= cost,
        EarningMode::Visits => balance.visit_credits -= cost,
    }
    balance.total_vouchers_generated += 1;
    balance.total_voucher_credits_earned += cost;
    Ok(())
}

/// Expiry timestamp: the type's validity, else the restaurant default.
pub fn expiry_for(now: i64, vt: &VoucherType, restaurant: &Restaurant) -> i64 {
    let days = vt
        .validity_days
        .unwrap_or(restaurant.voucher_validity_days)
        .max(1);
    now + i64::from(days) * DAY_MILLIS
}

fn validate_value(category: VoucherCategory, value: Option<Decimal>, free_item: Option<&str>) -> Result<(), AppError> {
    match category {
        VoucherCategory::RandValue => match value {
            Some(v) if v > Decimal::ZERO => Ok(()),
            _ => Err(AppError::validation("Rand value vouchers need a positive value")),
        },
        VoucherCategory::Percentage => match value {
            Some(v) if v > Decimal::ZERO && v <= Decimal::ONE_HUNDRED => Ok(()),
            _ => Err(AppError::validation(
                "Percentage vouchers need a value between 0 and 100",
            )),
        },
        VoucherCategory::FreeItem => match free_item {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(AppError::validation("Free item vouchers need an item name")),
        },
        VoucherCategory::Registration => Ok(()),
    }
}

fn validate_scope(
    scope: RedemptionScope,
    branch_ids: &[i64],
    restaurant_branch_ids: &[i64],
) -> Result<(), AppError> {
    if scope == RedemptionScope::SpecificBranches && branch_ids.is_empty() {
        return Err(AppError::validation(
            "Specific-branch vouchers need at least one branch",
        ));
    }
    if let Some(unknown) = branch_ids
        .iter()
        .find(|id| !restaurant_branch_ids.contains(id))
    {
        return Err(AppError::new(ErrorCode::BranchNotFound).with_detail("branch_id", *unknown));
    }
    Ok(())
}

fn validate_common(
    validity_days: Option<i32>,
    points_per_currency: Option<Decimal>,
) -> Result<(), AppError> {
    if validity_days.is_some_and(|d| d < 1) {
        return Err(AppError::validation("validity_days must be at least 1"));
    }
    if points_per_currency.is_some_and(|r| r.is_sign_negative() && !r.is_zero()) {
        return Err(AppError::validation("points_per_currency must not be negative"));
    }
    Ok(())
}

/// Validate and normalise a new voucher type.
///
/// Registration types always cost 0 and a restaurant may only have one.
pub fn prepare_voucher_type(
    mut data: VoucherTypeCreate,
    has_registration_type: bool,
    restaurant_branch_ids: &[i64],
) -> Result<VoucherTypeCreate, AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_value(data.category, data.value, data.free_item_name.as_deref())?;
    validate_common(data.validity_days, data.points_per_currency)?;
    validate_scope(
        data.redemption_scope,
        &data.redeemable_branch_ids,
        restaurant_branch_ids,
    )?;

    if data.category == VoucherCategory::Registration {
        if has_registration_type {
            return Err(AppError::new(ErrorCode::RegistrationTypeExists));
        }
        data.credits_cost = 0;
    } else if data.credits_cost < 1 {
        return Err(AppError::validation("credits_cost must be at least 1"));
    }

    data.name = data.name.trim().to_string();
    if data.redemption_scope == RedemptionScope::AllBranches {
        data.redeemable_branch_ids.clear();
    }
    Ok(data)
}

/// Apply an update onto an existing type, validating the merged result.
pub fn apply_voucher_type_update(
    vt: &mut VoucherType,
    data: VoucherTypeUpdate,
    restaurant_branch_ids: &[i64],
) -> Result<(), AppError> {
    if let Some(name) = data.name {
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        vt.name = name.trim().to_string();
    }
    if data.description.is_some() {
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        vt.description = data.description;
    }
    if data.value.is_some() {
        vt.value = data.value;
    }
    if data.free_item_name.is_some() {
        vt.free_item_name = data.free_item_name;
    }
    if let Some(cost) = data.credits_cost {
        vt.credits_cost = cost;
    }
    if data.validity_days.is_some() {
        vt.validity_days = data.validity_days;
    }
    if data.points_per_currency.is_some() {
        vt.points_per_currency = data.points_per_currency;
    }
    if let Some(active) = data.is_active {
        vt.is_active = active;
    }
    if let Some(scope) = data.redemption_scope {
        vt.redemption_scope = scope;
    }
    if let Some(ids) = data.redeemable_branch_ids {
        vt.redeemable_branch_ids = ids;
    }

    validate_value(vt.category, vt.value, vt.free_item_name.as_deref())?;
    validate_common(vt.validity_days, vt.points_per_currency)?;
    validate_scope(
        vt.redemption_scope,
        &vt.redeemable_branch_ids,
        restaurant_branch_ids,
    )?;
    if vt.category == VoucherCategory::Registration {
        vt.credits_cost = 0;
    } else if vt.credits_cost < 1 {
        return Err(AppError::validation("credits_cost must be at least 1"));
    }
    if vt.redemption_scope == RedemptionScope::AllBranches {
        vt.redeemable_branch_ids.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;

    fn create(category: VoucherCategory, cost: i32) -> VoucherTypeCreate {
        VoucherTypeCreate {
            name: " Welcome treat ".into(),
            description: None,
            category,
            value: Some(Decimal::new(5000, 2)),
            free_item_name: Some("Milkshake".into()),
            earning_mode: EarningMode::Points,
            credits_cost: cost,
            validity_days: Some(14),
            points_per_currency: None,
            redemption_scope: RedemptionScope::AllBranches,
            redeemable_branch_ids: Vec::new(),
        }
    }

    #[test]
    fn test_debit_points_credits() {
        let vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 2);
        let mut balance = fixtures::balance();
        balance.points_credits = 3;

        debit_credits(&mut balance, &vt).unwrap();

        assert_eq!(balance.points_credits, 1);
        assert_eq!(balance.total_vouchers_generated, 1);
        assert_eq!(balance.total_voucher_credits_earned, 2);
    }

    #[test]
    fn test_insufficient_credits_leaves_balance_untouched() {
        let vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Visits, 2);
        let mut balance = fixtures::balance();
        balance.visit_credits = 1;
        balance.points_credits = 10;

        let err = debit_credits(&mut balance, &vt).unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientCredits);
        assert_eq!(balance.visit_credits, 1);
        assert_eq!(balance.points_credits, 10);
        assert_eq!(balance.total_vouchers_generated, 0);
    }

    #[test]
    fn test_zero_cost_registration_debit() {
        let vt = fixtures::voucher_type(VoucherCategory::Registration, EarningMode::Points, 0);
        let mut balance = fixtures::balance();
        debit_credits(&mut balance, &vt).unwrap();
        assert_eq!(balance.points_credits, 0);
        assert_eq!(balance.total_vouchers_generated, 1);
        assert_eq!(balance.total_voucher_credits_earned, 0);
    }

    #[test]
    fn test_check_voucher_type() {
        let mut vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 1);
        assert!(check_voucher_type(&vt, 1).is_ok());
        assert_eq!(
            check_voucher_type(&vt, 2).unwrap_err().code,
            ErrorCode::VoucherTypeNotFound
        );
        vt.is_active = false;
        assert_eq!(
            check_voucher_type(&vt, 1).unwrap_err().code,
            ErrorCode::VoucherTypeInactive
        );
    }

    #[test]
    fn test_expiry_uses_type_then_restaurant_default() {
        let restaurant = fixtures::restaurant();
        let mut vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 1);
        assert_eq!(expiry_for(1_000, &vt, &restaurant), 1_000 + 30 * DAY_MILLIS);
        vt.validity_days = Some(7);
        assert_eq!(expiry_for(1_000, &vt, &restaurant), 1_000 + 7 * DAY_MILLIS);
    }

    #[test]
    fn test_registration_type_forced_to_zero_cost() {
        let prepared = prepare_voucher_type(create(VoucherCategory::Registration, 5), false, &[]).unwrap();
        assert_eq!(prepared.credits_cost, 0);
        assert_eq!(prepared.name, "Welcome treat");
    }

    #[test]
    fn test_second_registration_type_rejected() {
        let err = prepare_voucher_type(create(VoucherCategory::Registration, 0), true, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistrationTypeExists);
    }

    #[test]
    fn test_regular_type_needs_cost() {
        let err = prepare_voucher_type(create(VoucherCategory::FreeItem, 0), false, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_percentage_bounds() {
        let mut data = create(VoucherCategory::Percentage, 1);
        data.value = Some(Decimal::new(150, 0));
        assert!(prepare_voucher_type(data, false, &[]).is_err());

        let mut data = create(VoucherCategory::Percentage, 1);
        data.value = Some(Decimal::new(15, 0));
        assert!(prepare_voucher_type(data, false, &[]).is_ok());
    }

    #[test]
    fn test_specific_branches_must_belong_to_restaurant() {
        let mut data = create(VoucherCategory::FreeItem, 1);
        data.redemption_scope = RedemptionScope::SpecificBranches;
        data.redeemable_branch_ids = vec![100, 999];
        let err = prepare_voucher_type(data.clone(), false, &[100, 101]).unwrap_err();
        assert_eq!(err.code, ErrorCode::BranchNotFound);

        data.redeemable_branch_ids = vec![];
        assert!(prepare_voucher_type(data.clone(), false, &[100]).is_err());

        data.redeemable_branch_ids = vec![101];
        assert!(prepare_voucher_type(data, false, &[100, 101]).is_ok());
    }

    #[test]
    fn test_update_revalidates_merged_type() {
        let mut vt = fixtures::voucher_type(VoucherCategory::FreeItem, EarningMode::Points, 1);
        let update = VoucherTypeUpdate {
            credits_cost: Some(0),
            ..Default::default()
        };
        assert!(apply_voucher_type_update(&mut vt, update, &[]).is_err());

        let update = VoucherTypeUpdate {
            credits_cost: Some(3),
            is_active: Some(false),
            ..Default::default()
        };
        apply_voucher_type_update(&mut vt, update, &[]).unwrap();
        assert_eq!(vt.credits_cost, 3);
        assert!(!vt.is_active);
    }
}
