//! Transaction capture: points accrual and visit counting in one transaction

use shared::error::{AppError, ErrorCode};
use shared::models::{AccrualResult, Transaction, TransactionCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::loyalty::{accrual, visits};
use crate::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};

use super::{issuer, load_branch, load_diner, load_restaurant, lock_balance};

/// Record a spend for a diner and credit points and visits.
///
/// A diner's first transaction at a restaurant also issues the restaurant's
/// registration voucher, if one is configured.
pub async fn capture(
    pool: &PgPool,
    captured_by: i64,
    req: &TransactionCreate,
) -> ServiceResult<AccrualResult> {
    accrual::validate_amount(req.amount_spent)?;
    validate_optional_text(&req.bill_id, "bill_id", MAX_SHORT_TEXT_LEN)?;
    let bill_id = req
        .bill_id
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    let now = now_millis();
    let mut tx = pool.begin().await?;

    let restaurant = load_restaurant(&mut tx, req.restaurant_id).await?;
    load_diner(&mut tx, req.diner_id).await?;
    if let Some(branch_id) = req.branch_id {
        load_branch(&mut tx, req.restaurant_id, branch_id).await?;
    }

    let override_type = match req.voucher_type_id {
        Some(id) => Some(
            db::voucher_types::find(&mut *tx, id)
                .await?
                .filter(|vt| vt.restaurant_id == restaurant.id)
                .ok_or_else(|| AppError::new(ErrorCode::VoucherTypeNotFound))?,
        ),
        None => None,
    };
    let rate = accrual::effective_rate(&restaurant, override_type.as_ref());

    let joined = !db::balances::exists_for(&mut *tx, req.diner_id, restaurant.id).await?;
    let mut balance = lock_balance(&mut tx, &restaurant, req.diner_id, req.branch_id, now).await?;

    let points = accrual::accrue_points(&mut balance, &restaurant, rate, req.amount_spent)?;
    let visit = visits::record_visit(&mut balance, &restaurant, req.amount_spent)?;
    balance.updated_at = now;
    db::balances::save(&mut *tx, &balance).await?;

    let transaction = Transaction {
        id: snowflake_id(),
        diner_id: req.diner_id,
        restaurant_id: restaurant.id,
        branch_id: req.branch_id,
        amount_spent: req.amount_spent,
        points_earned: points.points_earned,
        visit_counted: visit.visit_counted,
        points_credits_earned: points.points_credits_earned,
        visit_credits_earned: visit.visit_credits_earned,
        bill_id,
        voucher_type_id: override_type.as_ref().map(|vt| vt.id),
        captured_by: Some(captured_by),
        created_at: now,
    };
    db::transactions::insert(&mut *tx, &transaction).await?;

    let welcome_voucher = if joined {
        let voucher_branch = issuer::voucher_branch(&restaurant, req.branch_id).ok().flatten();
        issuer::issue_registration_in_tx(&mut tx, &restaurant, &mut balance, voucher_branch, now)
            .await?
    } else {
        None
    };

    tx.commit().await?;

    tracing::info!(
        transaction_id = transaction.id,
        diner_id = transaction.diner_id,
        restaurant_id = transaction.restaurant_id,
        points_earned = transaction.points_earned,
        points_credits_earned = transaction.points_credits_earned,
        visit_counted = transaction.visit_counted,
        visit_credits_earned = transaction.visit_credits_earned,
        "Transaction captured"
    );

    Ok(AccrualResult {
        transaction,
        balance,
        welcome_voucher,
    })
}

/// Diner's spend history at one restaurant
pub async fn history(
    pool: &PgPool,
    diner_id: i64,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<Transaction>> {
    Ok(db::transactions::list_for_diner(pool, diner_id, restaurant_id, limit, offset).await?)
}
