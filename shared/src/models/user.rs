//! User Model

use serde::{Deserialize, Serialize};

/// Discriminates diners from restaurant-side accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "user_type", rename_all = "snake_case"))]
pub enum UserType {
    /// Diner, identified by phone
    Diner,
    /// Restaurant admin or staff, identified by email
    Restaurant,
    /// Platform operator (processes account deletions)
    Platform,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub user_type: UserType,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing, default)]
    pub hashed_password: Option<String>,
    /// Short-lived presentation code for the selected voucher
    #[serde(skip_serializing, default)]
    pub active_voucher_code: Option<String>,
    pub active_voucher_id: Option<i64>,
    pub active_voucher_code_set_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_diner(&self) -> bool {
        self.user_type == UserType::Diner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_secrets() {
        let user = User {
            id: 7,
            user_type: UserType::Diner,
            phone: Some("+27820000000".into()),
            email: None,
            name: Some("Thandi".into()),
            hashed_password: Some("$argon2id$secret".into()),
            active_voucher_code: Some("K7QX2M".into()),
            active_voucher_id: Some(11),
            active_voucher_code_set_at: Some(1_000),
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_type"], "diner");
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("active_voucher_code").is_none());
        assert_eq!(json["active_voucher_id"], 11);
        assert!(user.is_diner());
    }
}
