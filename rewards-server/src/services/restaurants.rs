//! Restaurant administration: loyalty configuration, branches, voucher types

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    ActivityLog, Branch, BranchCreate, BranchUpdate, DinerBalanceRow, Restaurant,
    RestaurantUpdate, Voucher, VoucherType, VoucherTypeCreate, VoucherTypeUpdate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{PgConnection, PgPool};

use crate::db;
use crate::error::ServiceResult;
use crate::loyalty::issuance;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};

use super::load_restaurant;

async fn log_change(
    conn: &mut PgConnection,
    restaurant_id: i64,
    user_id: i64,
    action: &str,
    detail: serde_json::Value,
    now: i64,
) -> ServiceResult<()> {
    db::activity::log(conn, Some(restaurant_id), Some(user_id), action, Some(&detail), now).await?;
    Ok(())
}

// ── Configuration ──

pub async fn get(pool: &PgPool, restaurant_id: i64) -> ServiceResult<Restaurant> {
    db::restaurants::find(pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound).into())
}

/// Merge an update into the restaurant and check the loyalty settings.
fn apply_update(r: &mut Restaurant, data: RestaurantUpdate) -> Result<(), AppError> {
    if let Some(name) = data.name {
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        r.name = name.trim().to_string();
    }
    if let Some(email) = data.email {
        validate_email(&email)?;
        r.email = Some(email.trim().to_lowercase());
    }
    if data.phone.is_some() {
        validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        r.phone = data.phone;
    }
    if let Some(rate) = data.points_per_currency {
        if rate < Decimal::ZERO {
            return Err(AppError::new(ErrorCode::InvalidLoyaltyConfig)
                .with_detail("field", "points_per_currency"));
        }
        r.points_per_currency = rate;
    }
    if let Some(threshold) = data.points_threshold {
        if threshold < 1 {
            return Err(AppError::new(ErrorCode::InvalidLoyaltyConfig)
                .with_detail("field", "points_threshold"));
        }
        r.points_threshold = threshold;
    }
    if let Some(threshold) = data.visit_threshold {
        if threshold < 1 {
            return Err(AppError::new(ErrorCode::InvalidLoyaltyConfig)
                .with_detail("field", "visit_threshold"));
        }
        r.visit_threshold = threshold;
    }
    if let Some(min_spend) = data.visit_min_spend {
        if min_spend < Decimal::ZERO {
            return Err(AppError::new(ErrorCode::InvalidLoyaltyConfig)
                .with_detail("field", "visit_min_spend"));
        }
        r.visit_min_spend = min_spend;
    }
    if let Some(days) = data.voucher_validity_days {
        if days < 1 {
            return Err(AppError::new(ErrorCode::InvalidLoyaltyConfig)
                .with_detail("field", "voucher_validity_days"));
        }
        r.voucher_validity_days = days;
    }
    if let Some(scope) = data.loyalty_scope {
        r.loyalty_scope = scope;
    }
    if let Some(scope) = data.voucher_scope {
        r.voucher_scope = scope;
    }
    Ok(())
}

/// Thresholds apply to future transactions only; banked credits stay.
pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    user_id: i64,
    data: RestaurantUpdate,
) -> ServiceResult<Restaurant> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let mut restaurant = load_restaurant(&mut tx, restaurant_id).await?;
    let changes = serde_json::to_value(&data).unwrap_or_default();
    apply_update(&mut restaurant, data)?;
    restaurant.updated_at = now;
    let restaurant = db::restaurants::update(&mut *tx, &restaurant).await?;

    log_change(&mut tx, restaurant_id, user_id, "restaurant_updated", changes, now).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, "Restaurant configuration updated");
    Ok(restaurant)
}

// ── Branches ──

pub async fn list_branches(pool: &PgPool, restaurant_id: i64) -> ServiceResult<Vec<Branch>> {
    Ok(db::restaurants::list_branches(pool, restaurant_id).await?)
}

pub async fn create_branch(
    pool: &PgPool,
    restaurant_id: i64,
    user_id: i64,
    data: &BranchCreate,
) -> ServiceResult<Branch> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    load_restaurant(&mut tx, restaurant_id).await?;

    if data.is_default {
        db::restaurants::clear_default_branch(&mut *tx, restaurant_id, now).await?;
    }
    let branch =
        db::restaurants::create_branch(&mut *tx, snowflake_id(), restaurant_id, data, now).await?;

    log_change(
        &mut tx,
        restaurant_id,
        user_id,
        "branch_created",
        serde_json::json!({ "branch_id": branch.id, "name": branch.name }),
        now,
    )
    .await?;
    tx.commit().await?;
    Ok(branch)
}

pub async fn update_branch(
    pool: &PgPool,
    restaurant_id: i64,
    branch_id: i64,
    user_id: i64,
    data: &BranchUpdate,
) -> ServiceResult<Branch> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let branch = db::restaurants::update_branch(&mut *tx, restaurant_id, branch_id, data, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound).with_detail("branch_id", branch_id))?;

    log_change(
        &mut tx,
        restaurant_id,
        user_id,
        "branch_updated",
        serde_json::json!({ "branch_id": branch.id }),
        now,
    )
    .await?;
    tx.commit().await?;
    Ok(branch)
}

/// Make one branch the default; the previous default is cleared first so the
/// one-default index holds.
pub async fn set_default_branch(
    pool: &PgPool,
    restaurant_id: i64,
    branch_id: i64,
    user_id: i64,
) -> ServiceResult<Branch> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    db::restaurants::clear_default_branch(&mut *tx, restaurant_id, now).await?;
    let branch = db::restaurants::mark_default_branch(&mut *tx, restaurant_id, branch_id, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound).with_detail("branch_id", branch_id))?;

    log_change(
        &mut tx,
        restaurant_id,
        user_id,
        "default_branch_changed",
        serde_json::json!({ "branch_id": branch.id }),
        now,
    )
    .await?;
    tx.commit().await?;
    Ok(branch)
}

// ── Voucher types ──

pub async fn list_voucher_types(pool: &PgPool, restaurant_id: i64) -> ServiceResult<Vec<VoucherType>> {
    Ok(db::voucher_types::list(pool, restaurant_id).await?)
}

pub async fn create_voucher_type(
    pool: &PgPool,
    restaurant_id: i64,
    user_id: i64,
    data: VoucherTypeCreate,
) -> ServiceResult<VoucherType> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    load_restaurant(&mut tx, restaurant_id).await?;

    let has_registration = db::voucher_types::find_registration(&mut *tx, restaurant_id)
        .await?
        .is_some();
    let branch_ids = db::restaurants::branch_ids(&mut *tx, restaurant_id).await?;
    let data = issuance::prepare_voucher_type(data, has_registration, &branch_ids)?;

    let vt = db::voucher_types::insert(&mut *tx, snowflake_id(), restaurant_id, &data, now).await?;
    log_change(
        &mut tx,
        restaurant_id,
        user_id,
        "voucher_type_created",
        serde_json::json!({ "voucher_type_id": vt.id, "name": vt.name, "category": vt.category }),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(voucher_type_id = vt.id, restaurant_id, "Voucher type created");
    Ok(vt)
}

/// Changes apply to vouchers issued afterwards; issued vouchers keep a copy
/// of the type's terms.
pub async fn update_voucher_type(
    pool: &PgPool,
    restaurant_id: i64,
    voucher_type_id: i64,
    user_id: i64,
    data: VoucherTypeUpdate,
) -> ServiceResult<VoucherType> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let mut vt = db::voucher_types::find(&mut *tx, voucher_type_id)
        .await?
        .filter(|vt| vt.restaurant_id == restaurant_id)
        .ok_or_else(|| AppError::new(ErrorCode::VoucherTypeNotFound))?;
    let branch_ids = db::restaurants::branch_ids(&mut *tx, restaurant_id).await?;
    issuance::apply_voucher_type_update(&mut vt, data, &branch_ids)?;
    vt.updated_at = now;
    let vt = db::voucher_types::save(&mut *tx, &vt).await?;

    log_change(
        &mut tx,
        restaurant_id,
        user_id,
        "voucher_type_updated",
        serde_json::json!({ "voucher_type_id": vt.id, "is_active": vt.is_active }),
        now,
    )
    .await?;
    tx.commit().await?;
    Ok(vt)
}

/// Soft delete: the type stops issuing, existing vouchers stay redeemable.
pub async fn deactivate_voucher_type(
    pool: &PgPool,
    restaurant_id: i64,
    voucher_type_id: i64,
    user_id: i64,
) -> ServiceResult<VoucherType> {
    update_voucher_type(
        pool,
        restaurant_id,
        voucher_type_id,
        user_id,
        VoucherTypeUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
}

// ── Read models ──

pub async fn list_vouchers(
    pool: &PgPool,
    restaurant_id: i64,
    redeemed: Option<bool>,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<Voucher>> {
    Ok(db::vouchers::list_for_restaurant(pool, restaurant_id, redeemed, limit, offset).await?)
}

pub async fn list_diners(
    pool: &PgPool,
    restaurant_id: i64,
    branch_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<DinerBalanceRow>> {
    Ok(db::balances::list_for_restaurant(pool, restaurant_id, branch_id, limit, offset).await?)
}

pub async fn activity(
    pool: &PgPool,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<ActivityLog>> {
    Ok(db::activity::query(pool, restaurant_id, limit, offset).await?)
}
