//! Voucher issuance: banked credits -> voucher

use shared::error::{AppError, ErrorCode};
use shared::models::{
    PointsBalance, RedeemCreditRequest, Restaurant, ScopeLevel, Voucher, VoucherCategory,
    VoucherType,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Connection, PgConnection, PgPool};

use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::loyalty::{codes, issuance};

use super::{load_branch, load_restaurant, lock_balance};

/// Debit the balance and persist a voucher with a fresh code.
///
/// Expects `balance` to be locked by the caller's transaction. The balance is
/// saved here; on error nothing is written and the caller rolls back.
pub(crate) async fn issue_in_tx(
    conn: &mut PgConnection,
    restaurant: &Restaurant,
    balance: &mut PointsBalance,
    vt: &VoucherType,
    voucher_branch_id: Option<i64>,
    now: i64,
) -> ServiceResult<Voucher> {
    issuance::check_voucher_type(vt, restaurant.id)?;

    if vt.category == VoucherCategory::Registration
        && db::vouchers::has_registration_voucher(&mut *conn, balance.diner_id, restaurant.id).await?
    {
        return Err(AppError::new(ErrorCode::RegistrationVoucherExists).into());
    }

    issuance::debit_credits(balance, vt)?;
    balance.updated_at = now;

    let mut voucher = Voucher {
        id: snowflake_id(),
        restaurant_id: restaurant.id,
        diner_id: balance.diner_id,
        branch_id: voucher_branch_id,
        voucher_type_id: vt.id,
        code: String::new(),
        name: vt.name.clone(),
        category: vt.category,
        earning_mode: vt.earning_mode,
        value: vt.value,
        free_item_name: vt.free_item_name.clone(),
        credits_spent: vt.credits_cost.max(0),
        expiry_date: issuance::expiry_for(now, vt, restaurant),
        is_redeemed: false,
        redeemed_at: None,
        redeemed_branch_id: None,
        redeemed_by: None,
        bill_id: None,
        created_at: now,
    };

    let mut inserted = None;
    for attempt in 1..=codes::MAX_CODE_ATTEMPTS {
        voucher.code = codes::generate_voucher_code();
        if let Some(v) = db::vouchers::insert_if_code_free(&mut *conn, &voucher).await? {
            inserted = Some(v);
            break;
        }
        tracing::debug!(attempt, restaurant_id = restaurant.id, "Voucher code collision, retrying");
    }
    let voucher = inserted.ok_or_else(|| AppError::new(ErrorCode::VoucherCodeExhausted))?;

    db::balances::save(&mut *conn, balance).await?;

    tracing::info!(
        voucher_id = voucher.id,
        diner_id = voucher.diner_id,
        restaurant_id = restaurant.id,
        voucher_type_id = vt.id,
        credits_spent = voucher.credits_spent,
        "Voucher issued"
    );
    Ok(voucher)
}

/// A concurrent first transaction issued the registration voucher first.
fn lost_registration_race(err: &ServiceError) -> bool {
    matches!(err, ServiceError::App(e) if e.code == ErrorCode::RegistrationVoucherExists)
}

/// Issue the restaurant's registration voucher if it has an active one and the
/// diner never received it.
///
/// Runs under a savepoint: losing the race on the one-per-diner index drops
/// only the voucher, not the caller's transaction.
pub(crate) async fn issue_registration_in_tx(
    conn: &mut PgConnection,
    restaurant: &Restaurant,
    balance: &mut PointsBalance,
    voucher_branch_id: Option<i64>,
    now: i64,
) -> ServiceResult<Option<Voucher>> {
    let Some(vt) = db::voucher_types::find_registration(&mut *conn, restaurant.id).await? else {
        return Ok(None);
    };
    if !vt.is_active
        || db::vouchers::has_registration_voucher(&mut *conn, balance.diner_id, restaurant.id).await?
    {
        return Ok(None);
    }

    let mut issued = balance.clone();
    let mut savepoint = conn.begin().await?;
    match issue_in_tx(&mut savepoint, restaurant, &mut issued, &vt, voucher_branch_id, now).await {
        Ok(voucher) => {
            savepoint.commit().await?;
            *balance = issued;
            Ok(Some(voucher))
        }
        Err(e) if lost_registration_race(&e) => {
            savepoint.rollback().await?;
            tracing::debug!(
                diner_id = balance.diner_id,
                restaurant_id = restaurant.id,
                "Registration voucher already issued concurrently"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Branch a new voucher is tied to: only kept when vouchers are branch-scoped.
pub(crate) fn voucher_branch(
    restaurant: &Restaurant,
    branch_id: Option<i64>,
) -> Result<Option<i64>, AppError> {
    match restaurant.voucher_scope {
        ScopeLevel::Organization => Ok(None),
        ScopeLevel::Branch => branch_id
            .map(Some)
            .ok_or_else(|| AppError::new(ErrorCode::BranchRequired)),
    }
}

/// Diner exchanges banked credits for a voucher of the given type.
pub async fn redeem_credit(
    pool: &PgPool,
    diner_id: i64,
    restaurant_id: i64,
    req: &RedeemCreditRequest,
) -> ServiceResult<Voucher> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let restaurant = load_restaurant(&mut tx, restaurant_id).await?;
    if let Some(branch_id) = req.branch_id {
        load_branch(&mut tx, restaurant_id, branch_id).await?;
    }

    let vt = db::voucher_types::find(&mut *tx, req.voucher_type_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherTypeNotFound))?;
    issuance::check_voucher_type(&vt, restaurant_id)?;

    let voucher_branch_id = voucher_branch(&restaurant, req.branch_id)?;
    let mut balance = lock_balance(&mut tx, &restaurant, diner_id, req.branch_id, now).await?;

    let voucher = issue_in_tx(&mut tx, &restaurant, &mut balance, &vt, voucher_branch_id, now).await?;

    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(diner_id),
        "voucher_issued",
        Some(&serde_json::json!({
            "voucher_id": voucher.id,
            "voucher_type_id": vt.id,
            "credits_spent": voucher.credits_spent,
        })),
        now,
    )
    .await?;

    tx.commit().await?;
    Ok(voucher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;

    #[test]
    fn test_registration_race_is_recognised() {
        let lost: ServiceError = AppError::new(ErrorCode::RegistrationVoucherExists).into();
        assert!(lost_registration_race(&lost));

        let other: ServiceError = AppError::new(ErrorCode::InsufficientCredits).into();
        assert!(!lost_registration_race(&other));
        let db: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(!lost_registration_race(&db));
    }

    #[test]
    fn test_voucher_branch_follows_scope() {
        let mut restaurant = fixtures::restaurant();
        assert_eq!(voucher_branch(&restaurant, Some(5)).unwrap(), None);

        restaurant.voucher_scope = ScopeLevel::Branch;
        assert_eq!(voucher_branch(&restaurant, Some(5)).unwrap(), Some(5));
        assert_eq!(
            voucher_branch(&restaurant, None).unwrap_err().code,
            ErrorCode::BranchRequired
        );
    }
}
