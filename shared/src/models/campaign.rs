//! Campaign & Invitation Models

use serde::{Deserialize, Serialize};

use super::balance::PointsBalance;
use super::voucher::Voucher;

/// Delivery channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "notify_channel", rename_all = "snake_case")
)]
pub enum NotifyChannel {
    Sms,
    Email,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "campaign_status", rename_all = "snake_case")
)]
pub enum CampaignStatus {
    Draft,
    Sent,
}

/// Marketing message to a restaurant's diners
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Campaign {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub message: String,
    pub channel: NotifyChannel,
    pub status: CampaignStatus,
    pub recipients_count: i32,
    pub created_by: Option<i64>,
    pub sent_at: Option<i64>,
    pub created_at: i64,
}

/// Create campaign payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignCreate {
    pub name: String,
    pub message: String,
    pub channel: NotifyChannel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "invitation_status", rename_all = "snake_case")
)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

/// Invitation for a diner to join a restaurant's programme
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DinerInvitation {
    pub id: i64,
    pub restaurant_id: i64,
    pub branch_id: Option<i64>,
    pub phone: String,
    /// SHA-256 of the token sent to the diner
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub status: InvitationStatus,
    pub invited_by: Option<i64>,
    pub expires_at: i64,
    pub accepted_at: Option<i64>,
    pub created_at: i64,
}

/// Create invitation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationCreate {
    pub phone: String,
    pub branch_id: Option<i64>,
}

/// Accept invitation payload (diner authenticated by phone OTP)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationAccept {
    pub token: String,
}

/// Outcome of accepting an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationAccepted {
    pub invitation: DinerInvitation,
    pub balance: PointsBalance,
    /// Registration voucher issued on joining, if the restaurant has one
    pub welcome_voucher: Option<Voucher>,
}
