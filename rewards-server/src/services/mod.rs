//! Service layer: transactional orchestration over `db` and `loyalty`
//!
//! Each public operation opens one transaction, locks the rows it mutates,
//! applies the pure rules and commits. Errors roll the transaction back.

pub mod accounts;
pub mod accrual;
pub mod engagement;
pub mod issuer;
pub mod presentation;
pub mod reconciliation;
pub mod restaurants;
pub mod staff;

use shared::error::{AppError, ErrorCode};
use shared::models::{Branch, PointsBalance, Restaurant, ScopeLevel, User};
use shared::util::snowflake_id;
use sqlx::PgConnection;

use crate::db;
use crate::error::ServiceResult;

/// Active restaurant or a typed error
pub(crate) async fn load_restaurant(
    conn: &mut PgConnection,
    restaurant_id: i64,
) -> ServiceResult<Restaurant> {
    let restaurant = db::restaurants::find(&mut *conn, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    if !restaurant.is_active {
        return Err(AppError::new(ErrorCode::RestaurantInactive).into());
    }
    Ok(restaurant)
}

/// A looked-up branch is usable only if it is an active branch of the
/// restaurant. Unknown ids and other restaurants' branches are not found.
fn usable_branch(
    branch: Option<Branch>,
    restaurant_id: i64,
    branch_id: i64,
) -> Result<Branch, AppError> {
    let branch = branch
        .filter(|b| b.restaurant_id == restaurant_id)
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound).with_detail("branch_id", branch_id))?;
    if !branch.is_active {
        return Err(AppError::new(ErrorCode::BranchInactive));
    }
    Ok(branch)
}

/// Active branch of the restaurant or a typed error
pub(crate) async fn load_branch(
    conn: &mut PgConnection,
    restaurant_id: i64,
    branch_id: i64,
) -> ServiceResult<Branch> {
    let branch = db::restaurants::find_branch(&mut *conn, restaurant_id, branch_id).await?;
    Ok(usable_branch(branch, restaurant_id, branch_id)?)
}

/// Active diner or `DinerNotFound`
pub(crate) async fn load_diner(conn: &mut PgConnection, diner_id: i64) -> ServiceResult<User> {
    db::users::find_by_id(&mut *conn, diner_id)
        .await?
        .filter(|u| u.is_diner() && u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::DinerNotFound).into())
}

/// Balance scope: the branch only counts when loyalty is branch-scoped.
pub(crate) fn balance_branch(
    restaurant: &Restaurant,
    branch_id: Option<i64>,
) -> Result<Option<i64>, AppError> {
    match restaurant.loyalty_scope {
        ScopeLevel::Organization => Ok(None),
        ScopeLevel::Branch => branch_id
            .map(Some)
            .ok_or_else(|| AppError::new(ErrorCode::BranchRequired)),
    }
}

/// Ensure the diner's balance row exists for the scope, then lock it.
pub(crate) async fn lock_balance(
    conn: &mut PgConnection,
    restaurant: &Restaurant,
    diner_id: i64,
    branch_id: Option<i64>,
    now: i64,
) -> ServiceResult<PointsBalance> {
    let scope_branch = balance_branch(restaurant, branch_id)?;
    db::balances::ensure(
        &mut *conn,
        snowflake_id(),
        diner_id,
        restaurant.id,
        scope_branch,
        now,
    )
    .await?;
    db::balances::lock(&mut *conn, diner_id, restaurant.id, scope_branch)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BalanceNotFound).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::fixtures;

    fn branch(restaurant_id: i64, is_active: bool) -> Branch {
        Branch {
            id: 5,
            restaurant_id,
            name: "Harbour".into(),
            address: None,
            phone: None,
            is_default: false,
            is_active,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_usable_branch() {
        assert_eq!(usable_branch(Some(branch(1, true)), 1, 5).unwrap().id, 5);

        let err = usable_branch(None, 1, 404).unwrap_err();
        assert_eq!(err.code, ErrorCode::BranchNotFound);
        assert_eq!(err.details.unwrap()["branch_id"], 404);

        // Another restaurant's branch is indistinguishable from an unknown one
        assert_eq!(
            usable_branch(Some(branch(2, true)), 1, 5).unwrap_err().code,
            ErrorCode::BranchNotFound
        );
        assert_eq!(
            usable_branch(Some(branch(1, false)), 1, 5).unwrap_err().code,
            ErrorCode::BranchInactive
        );
    }

    #[test]
    fn test_balance_branch_follows_loyalty_scope() {
        let mut restaurant = fixtures::restaurant();
        assert_eq!(balance_branch(&restaurant, Some(3)).unwrap(), None);

        restaurant.loyalty_scope = ScopeLevel::Branch;
        assert_eq!(balance_branch(&restaurant, Some(3)).unwrap(), Some(3));
        assert_eq!(
            balance_branch(&restaurant, None).unwrap_err().code,
            ErrorCode::BranchRequired
        );
    }
}
