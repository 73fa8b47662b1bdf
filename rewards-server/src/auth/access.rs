//! Authorization checks on top of an authenticated `Identity`

use shared::error::{AppError, ErrorCode};
use shared::models::{PortalUser, UserType};

use super::Identity;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// Diner routes act on the caller's own data only.
pub fn require_self_diner(identity: &Identity, diner_id: i64) -> Result<(), AppError> {
    if identity.user_type != UserType::Diner || identity.user_id != diner_id {
        return Err(AppError::permission_denied("Diners may only access their own data"));
    }
    Ok(())
}

pub fn require_platform(identity: &Identity) -> Result<(), AppError> {
    if identity.user_type != UserType::Platform {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}

/// Active portal membership for the restaurant
pub async fn require_member(
    state: &AppState,
    identity: &Identity,
    restaurant_id: i64,
) -> Result<PortalUser, AppError> {
    if identity.user_type != UserType::Restaurant {
        return Err(AppError::permission_denied("Restaurant portal access required"));
    }
    db::portal_users::find_active(&state.pool, identity.user_id, restaurant_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::permission_denied("Not a member of this restaurant"))
}

/// Owner or manager membership
pub async fn require_manager(
    state: &AppState,
    identity: &Identity,
    restaurant_id: i64,
) -> Result<PortalUser, AppError> {
    let membership = require_member(state, identity, restaurant_id).await?;
    if !membership.role.can_configure() {
        return Err(AppError::new(ErrorCode::RoleRequired));
    }
    Ok(membership)
}

/// Staff pinned to a branch act at that branch only. Returns the branch to
/// use for the operation.
pub fn resolve_branch(
    membership: &PortalUser,
    requested: Option<i64>,
) -> Result<Option<i64>, AppError> {
    match (membership.branch_id, requested) {
        (Some(own), Some(req)) if own != req => Err(AppError::permission_denied(
            "Staff may only act at their own branch",
        )
        .with_detail("branch_id", req)),
        (Some(own), _) => Ok(Some(own)),
        (None, req) => Ok(req),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PortalRole;

    fn membership(branch_id: Option<i64>) -> PortalUser {
        PortalUser {
            id: 1,
            user_id: 2,
            restaurant_id: 3,
            role: PortalRole::Staff,
            branch_id,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_require_self_diner() {
        let me = Identity {
            user_id: 7,
            user_type: UserType::Diner,
        };
        assert!(require_self_diner(&me, 7).is_ok());
        assert!(require_self_diner(&me, 8).is_err());

        let staff = Identity {
            user_id: 7,
            user_type: UserType::Restaurant,
        };
        assert!(require_self_diner(&staff, 7).is_err());
    }

    #[test]
    fn test_require_platform() {
        let admin = Identity {
            user_id: 1,
            user_type: UserType::Platform,
        };
        assert!(require_platform(&admin).is_ok());
        let diner = Identity {
            user_id: 1,
            user_type: UserType::Diner,
        };
        assert_eq!(
            require_platform(&diner).unwrap_err().code,
            ErrorCode::AdminRequired
        );
    }

    #[test]
    fn test_resolve_branch() {
        assert_eq!(resolve_branch(&membership(None), Some(5)).unwrap(), Some(5));
        assert_eq!(resolve_branch(&membership(None), None).unwrap(), None);
        assert_eq!(resolve_branch(&membership(Some(5)), None).unwrap(), Some(5));
        assert_eq!(resolve_branch(&membership(Some(5)), Some(5)).unwrap(), Some(5));
        assert!(resolve_branch(&membership(Some(5)), Some(6)).is_err());
    }
}
