//! Portal membership, activity log and account lifecycle models

use serde::{Deserialize, Serialize};

/// Staff role within a restaurant portal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "portal_role", rename_all = "snake_case"))]
pub enum PortalRole {
    Owner,
    Manager,
    Staff,
}

impl PortalRole {
    /// Owners and managers may change restaurant configuration
    pub fn can_configure(&self) -> bool {
        matches!(self, Self::Owner | Self::Manager)
    }
}

/// Membership of a restaurant-side user in a restaurant portal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PortalUser {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub role: PortalRole,
    pub branch_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Membership with the user's identity (staff list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PortalUserDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub membership: PortalUser,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Add staff payload; creates the user when the email is unknown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalUserCreate {
    pub email: String,
    pub name: Option<String>,
    /// Initial password, required when the user does not exist yet
    pub password: Option<String>,
    pub role: PortalRole,
    pub branch_id: Option<i64>,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalUserUpdate {
    pub role: Option<PortalRole>,
    pub branch_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ActivityLog {
    pub id: i64,
    pub restaurant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "deletion_status", rename_all = "snake_case")
)]
pub enum DeletionStatus {
    Pending,
    Processed,
}

/// Diner asks for their account to be removed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AccountDeletionRequest {
    pub id: i64,
    pub user_id: i64,
    pub reason: Option<String>,
    pub status: DeletionStatus,
    pub requested_at: i64,
    pub processed_at: Option<i64>,
}

/// Snapshot of a removed user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ArchivedUser {
    pub id: i64,
    pub original_user_id: i64,
    pub snapshot: serde_json::Value,
    pub archived_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(PortalRole::Owner.can_configure());
        assert!(PortalRole::Manager.can_configure());
        assert!(!PortalRole::Staff.can_configure());
    }
}
