//! Presentation codes and voucher redemption

use shared::error::{AppError, ErrorCode};
use shared::models::{
    PresentedVoucher, RedeemVoucherRequest, RedemptionPreview, User, Voucher,
};
use shared::util::now_millis;
use sqlx::{PgConnection, PgPool};

use crate::db;
use crate::error::ServiceResult;
use crate::loyalty::codes;
use crate::loyalty::redemption::{self, PresentedCode};
use crate::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};

use super::{load_branch, load_restaurant};

/// Diner selects a voucher to show at the till; replaces any previous code.
pub async fn select(
    pool: &PgPool,
    diner_id: i64,
    voucher_id: i64,
    ttl_millis: i64,
) -> ServiceResult<PresentedVoucher> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let voucher = db::vouchers::lock(&mut *tx, voucher_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?;
    redemption::check_selectable(&voucher, diner_id, now)?;

    let mut chosen = None;
    for _ in 0..codes::MAX_CODE_ATTEMPTS {
        let code = codes::generate_presentation_code();
        if !db::users::presentation_code_in_use(&mut *tx, &code, now - ttl_millis, diner_id).await? {
            chosen = Some(code);
            break;
        }
    }
    let code = chosen.ok_or_else(|| AppError::new(ErrorCode::VoucherCodeExhausted))?;

    db::users::set_presentation_code(&mut *tx, diner_id, &code, voucher.id, now).await?;
    tx.commit().await?;

    tracing::info!(diner_id, voucher_id = voucher.id, "Voucher selected for presentation");
    Ok(PresentedVoucher {
        voucher,
        presentation_code: code,
        expires_at: redemption::presentation_expires_at(now, ttl_millis),
    })
}

pub async fn clear(pool: &PgPool, diner_id: i64) -> ServiceResult<()> {
    db::users::clear_presentation_code(pool, diner_id, now_millis()).await?;
    Ok(())
}

/// Holder of a live code (if any) and what the code points at
struct Presented {
    holder: Option<User>,
    code: String,
    target: PresentedCode,
}

/// Resolve a presented code: first the diner currently holding it, then a
/// voucher of this restaurant already redeemed with it.
async fn resolve(
    conn: &mut PgConnection,
    restaurant_id: i64,
    code: &str,
    lock: bool,
) -> ServiceResult<Presented> {
    let code = codes::normalize_code(code);
    if !codes::is_presentation_code(&code) {
        return Err(AppError::new(ErrorCode::PresentationCodeNotFound).into());
    }

    // Only the voucher row is locked: a concurrent redeem that loses waits on
    // it and then sees `is_redeemed`.
    let holder = db::users::find_by_presentation_code(&mut *conn, &code)
        .await?
        .filter(|h| h.active_voucher_id.is_some());

    let Some(holder) = holder else {
        let voucher = db::vouchers::find_by_redeemed_code(&mut *conn, restaurant_id, &code)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::PresentationCodeNotFound))?;
        return Ok(Presented {
            holder: None,
            code,
            target: PresentedCode::Spent(voucher),
        });
    };

    let voucher_id = holder
        .active_voucher_id
        .ok_or_else(|| AppError::new(ErrorCode::PresentationCodeNotFound))?;
    let voucher = if lock {
        db::vouchers::lock(&mut *conn, voucher_id).await?
    } else {
        db::vouchers::find(&mut *conn, voucher_id).await?
    }
    .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?;

    Ok(Presented {
        target: PresentedCode::Live {
            set_at: holder.active_voucher_code_set_at,
            voucher,
        },
        holder: Some(holder),
        code,
    })
}

/// Staff redeem a presented code.
///
/// Checks run in order: code known, code window, restaurant, already
/// redeemed, voucher expiry, branch. Nothing is written on failure.
pub async fn redeem(
    pool: &PgPool,
    restaurant_id: i64,
    staff_user_id: i64,
    branch_id: Option<i64>,
    req: &RedeemVoucherRequest,
    ttl_millis: i64,
) -> ServiceResult<Voucher> {
    validate_optional_text(&req.bill_id, "bill_id", MAX_SHORT_TEXT_LEN)?;
    let bill_id = req.bill_id.as_deref().map(str::trim).filter(|b| !b.is_empty());

    let now = now_millis();
    let mut tx = pool.begin().await?;

    let restaurant = load_restaurant(&mut tx, restaurant_id).await?;
    if let Some(branch_id) = branch_id {
        load_branch(&mut tx, restaurant_id, branch_id).await?;
    }

    let Presented {
        holder,
        code,
        target,
    } = resolve(&mut tx, restaurant_id, &req.code, true).await?;
    let voucher = target.voucher();
    let vt = db::voucher_types::find(&mut *tx, voucher.voucher_type_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherTypeNotFound))?;
    redemption::check_presented(&target, &restaurant, &vt, branch_id, now, ttl_millis)?;

    let redeemed = db::vouchers::mark_redeemed(
        &mut *tx,
        voucher.id,
        now,
        branch_id,
        staff_user_id,
        bill_id,
        &code,
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::VoucherAlreadyRedeemed))?;

    if let Some(holder) = &holder {
        db::users::clear_presentation_code(&mut *tx, holder.id, now).await?;
    }
    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(staff_user_id),
        "voucher_redeemed",
        Some(&serde_json::json!({
            "voucher_id": redeemed.id,
            "diner_id": redeemed.diner_id,
            "branch_id": branch_id,
            "bill_id": bill_id,
        })),
        now,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        voucher_id = redeemed.id,
        restaurant_id,
        staff_user_id,
        "Voucher redeemed"
    );
    Ok(redeemed)
}

/// Look up a presented code and report whether it would redeem now.
pub async fn preview(
    pool: &PgPool,
    restaurant_id: i64,
    code: &str,
    branch_id: Option<i64>,
    ttl_millis: i64,
) -> ServiceResult<RedemptionPreview> {
    let now = now_millis();
    let mut conn = pool.acquire().await?;

    let restaurant = load_restaurant(&mut conn, restaurant_id).await?;
    if let Some(branch_id) = branch_id {
        load_branch(&mut conn, restaurant_id, branch_id).await?;
    }

    let Presented { holder, target, .. } = resolve(&mut conn, restaurant_id, code, false).await?;
    if target.voucher().restaurant_id != restaurant_id {
        return Err(AppError::new(ErrorCode::VoucherNotFound).into());
    }
    let vt = db::voucher_types::find(&mut *conn, target.voucher().voucher_type_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherTypeNotFound))?;

    let reason = redemption::check_presented(&target, &restaurant, &vt, branch_id, now, ttl_millis)
        .err()
        .map(|e| e.code.code());
    let voucher = match target {
        PresentedCode::Live { voucher, .. } | PresentedCode::Spent(voucher) => voucher,
    };

    Ok(RedemptionPreview {
        voucher,
        diner_name: holder.and_then(|h| h.name),
        redeemable: reason.is_none(),
        reason,
    })
}
