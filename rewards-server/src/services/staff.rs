//! Portal staff management

use shared::error::{AppError, ErrorCode};
use shared::models::{
    PortalRole, PortalUser, PortalUserCreate, PortalUserDetail, PortalUserUpdate, UserType,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::util::hash_password;
use crate::validation::{
    MAX_NAME_LEN, validate_email, validate_optional_text, validate_password,
};

use super::{load_branch, load_restaurant};

pub async fn list(pool: &PgPool, restaurant_id: i64) -> ServiceResult<Vec<PortalUserDetail>> {
    Ok(db::portal_users::list(pool, restaurant_id).await?)
}

/// Add a member by email. Unknown emails get a new restaurant account, which
/// needs an initial password.
pub async fn add(
    pool: &PgPool,
    restaurant_id: i64,
    added_by: i64,
    req: &PortalUserCreate,
) -> ServiceResult<PortalUser> {
    validate_email(&req.email)?;
    validate_optional_text(&req.name, "name", MAX_NAME_LEN)?;
    let email = req.email.trim().to_lowercase();

    let now = now_millis();
    let mut tx = pool.begin().await?;
    load_restaurant(&mut tx, restaurant_id).await?;
    if let Some(branch_id) = req.branch_id {
        load_branch(&mut tx, restaurant_id, branch_id).await?;
    }

    let user = match db::users::find_by_email(&mut *tx, &email).await? {
        Some(user) if user.user_type != UserType::Restaurant => {
            return Err(AppError::with_message(
                ErrorCode::AlreadyExists,
                "Email belongs to a non-restaurant account",
            )
            .into());
        }
        Some(user) => user,
        None => {
            let password = req
                .password
                .as_deref()
                .ok_or_else(|| AppError::new(ErrorCode::RequiredField).with_detail("field", "password"))?;
            validate_password(password)?;
            let hashed = hash_password(password).map_err(|_| AppError::new(ErrorCode::InternalError))?;
            db::users::create_account(
                &mut *tx,
                snowflake_id(),
                UserType::Restaurant,
                &email,
                req.name.as_deref().map(str::trim),
                &hashed,
                now,
            )
            .await?
        }
    };

    let membership = db::portal_users::insert(
        &mut *tx,
        snowflake_id(),
        user.id,
        restaurant_id,
        req.role,
        req.branch_id,
        now,
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::PortalUserExists))?;

    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(added_by),
        "portal_user_added",
        Some(&serde_json::json!({ "user_id": user.id, "role": req.role })),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, user_id = user.id, role = ?req.role, "Portal user added");
    Ok(membership)
}

/// A restaurant always keeps at least one active owner.
fn removes_owner(current: &PortalUser, data: &PortalUserUpdate) -> bool {
    current.role == PortalRole::Owner
        && current.is_active
        && (data.role.is_some_and(|r| r != PortalRole::Owner) || data.is_active == Some(false))
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    portal_user_id: i64,
    updated_by: i64,
    data: &PortalUserUpdate,
) -> ServiceResult<PortalUser> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let current = db::portal_users::find(&mut *tx, restaurant_id, portal_user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortalUserNotFound))?;
    if let Some(branch_id) = data.branch_id {
        load_branch(&mut tx, restaurant_id, branch_id).await?;
    }
    if removes_owner(&current, data)
        && db::portal_users::count_active_owners(&mut *tx, restaurant_id).await? <= 1
    {
        return Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            "A restaurant needs at least one active owner",
        )
        .into());
    }

    let membership = db::portal_users::update(&mut *tx, restaurant_id, portal_user_id, data, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PortalUserNotFound))?;

    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(updated_by),
        "portal_user_updated",
        Some(&serde_json::json!({
            "portal_user_id": portal_user_id,
            "role": membership.role,
            "is_active": membership.is_active,
        })),
        now,
    )
    .await?;
    tx.commit().await?;
    Ok(membership)
}

pub async fn deactivate(
    pool: &PgPool,
    restaurant_id: i64,
    portal_user_id: i64,
    updated_by: i64,
) -> ServiceResult<PortalUser> {
    let data = PortalUserUpdate {
        is_active: Some(false),
        ..Default::default()
    };
    update(pool, restaurant_id, portal_user_id, updated_by, &data).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(role: PortalRole) -> PortalUser {
        PortalUser {
            id: 1,
            user_id: 2,
            restaurant_id: 3,
            role,
            branch_id: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_removes_owner() {
        let owner = member(PortalRole::Owner);
        let demote = PortalUserUpdate {
            role: Some(PortalRole::Manager),
            ..Default::default()
        };
        let disable = PortalUserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let rebranch = PortalUserUpdate {
            branch_id: Some(9),
            ..Default::default()
        };
        assert!(removes_owner(&owner, &demote));
        assert!(removes_owner(&owner, &disable));
        assert!(!removes_owner(&owner, &rebranch));
        assert!(!removes_owner(&member(PortalRole::Staff), &disable));
    }
}
