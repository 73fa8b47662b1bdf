//! Diner engagement: invitations and marketing campaigns

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Campaign, CampaignCreate, CampaignStatus, DinerInvitation, InvitationAccepted,
    InvitationCreate, InvitationStatus, NotifyChannel,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::notify::{self, Notifier};
use crate::util::{generate_token, normalize_phone, sha256_hex};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SMS_LEN, validate_phone, validate_required_text,
};

use super::{balance_branch, issuer, load_branch, load_diner, load_restaurant, lock_balance};

// ── Invitations ──

/// Invite a phone number to the programme; the token goes out by SMS.
pub async fn invite(
    pool: &PgPool,
    notifier: &dyn Notifier,
    restaurant_id: i64,
    invited_by: i64,
    ttl_millis: i64,
    req: &InvitationCreate,
) -> ServiceResult<DinerInvitation> {
    let phone = normalize_phone(&req.phone);
    validate_phone(&phone)?;

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let restaurant = load_restaurant(&mut tx, restaurant_id).await?;
    if let Some(branch_id) = req.branch_id {
        load_branch(&mut tx, restaurant_id, branch_id).await?;
    }
    balance_branch(&restaurant, req.branch_id)?;

    let token = generate_token();
    let invitation = DinerInvitation {
        id: snowflake_id(),
        restaurant_id,
        branch_id: req.branch_id,
        phone,
        token_hash: sha256_hex(&token),
        status: InvitationStatus::Pending,
        invited_by: Some(invited_by),
        expires_at: now + ttl_millis,
        accepted_at: None,
        created_at: now,
    };
    db::invitations::insert(&mut *tx, &invitation).await?;
    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(invited_by),
        "diner_invited",
        Some(&serde_json::json!({ "invitation_id": invitation.id })),
        now,
    )
    .await?;
    tx.commit().await?;

    let body = notify::invitation_sms(&restaurant.name, &token);
    if let Err(e) = notifier.send_sms(&invitation.phone, &body).await {
        tracing::warn!(invitation_id = invitation.id, error = %e, "Failed to send invitation SMS");
    }
    Ok(invitation)
}

pub async fn list_invitations(
    pool: &PgPool,
    restaurant_id: i64,
) -> ServiceResult<Vec<DinerInvitation>> {
    Ok(db::invitations::list(pool, restaurant_id).await?)
}

/// State checks for a pending invitation, in order.
fn check_invitation(inv: &DinerInvitation, now: i64) -> Result<(), AppError> {
    match inv.status {
        InvitationStatus::Accepted => Err(AppError::new(ErrorCode::InvitationAlreadyAccepted)),
        InvitationStatus::Expired => Err(AppError::new(ErrorCode::InvitationExpired)),
        InvitationStatus::Pending if inv.expires_at < now => {
            Err(AppError::new(ErrorCode::InvitationExpired))
        }
        InvitationStatus::Pending => Ok(()),
    }
}

/// Diner accepts an invitation sent to their phone. Joining creates the
/// balance and issues the welcome voucher.
pub async fn accept_invitation(
    pool: &PgPool,
    notifier: &dyn Notifier,
    diner_id: i64,
    token: &str,
) -> ServiceResult<InvitationAccepted> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let mut invitation = db::invitations::lock_by_token_hash(&mut *tx, &sha256_hex(token.trim()))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvitationNotFound))?;
    if let Err(e) = check_invitation(&invitation, now) {
        if invitation.status == InvitationStatus::Pending {
            db::invitations::mark_expired(&mut *tx, invitation.id).await?;
            tx.commit().await?;
        }
        return Err(e.into());
    }

    let diner = load_diner(&mut tx, diner_id).await?;
    if diner.phone.as_deref() != Some(invitation.phone.as_str()) {
        return Err(AppError::permission_denied("Invitation was sent to another phone").into());
    }

    let restaurant = load_restaurant(&mut tx, invitation.restaurant_id).await?;
    let joined = !db::balances::exists_for(&mut *tx, diner_id, restaurant.id).await?;
    let mut balance = lock_balance(&mut tx, &restaurant, diner_id, invitation.branch_id, now).await?;

    let welcome_voucher = if joined {
        let voucher_branch = issuer::voucher_branch(&restaurant, invitation.branch_id)
            .ok()
            .flatten();
        issuer::issue_registration_in_tx(&mut tx, &restaurant, &mut balance, voucher_branch, now)
            .await?
    } else {
        None
    };

    db::invitations::mark_accepted(&mut *tx, invitation.id, now).await?;
    db::activity::log(
        &mut *tx,
        Some(restaurant.id),
        Some(diner_id),
        "invitation_accepted",
        Some(&serde_json::json!({
            "invitation_id": invitation.id,
            "welcome_voucher_id": welcome_voucher.as_ref().map(|v| v.id),
        })),
        now,
    )
    .await?;
    tx.commit().await?;

    invitation.status = InvitationStatus::Accepted;
    invitation.accepted_at = Some(now);

    if let (Some(voucher), Some(phone)) = (&welcome_voucher, diner.phone.as_deref()) {
        let body = notify::voucher_issued_sms(&restaurant.name, &voucher.name, &voucher.code);
        if let Err(e) = notifier.send_sms(phone, &body).await {
            tracing::warn!(voucher_id = voucher.id, error = %e, "Failed to send welcome voucher SMS");
        }
    }

    tracing::info!(invitation_id = invitation.id, diner_id, joined, "Invitation accepted");
    Ok(InvitationAccepted {
        invitation,
        balance,
        welcome_voucher,
    })
}

// ── Campaigns ──

fn validate_campaign(data: &CampaignCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    let max_len = match data.channel {
        NotifyChannel::Sms => MAX_SMS_LEN,
        NotifyChannel::Email => MAX_NOTE_LEN,
    };
    validate_required_text(&data.message, "message", max_len)
}

pub async fn create_campaign(
    pool: &PgPool,
    restaurant_id: i64,
    created_by: i64,
    data: &CampaignCreate,
) -> ServiceResult<Campaign> {
    validate_campaign(data)?;
    let now = now_millis();
    let mut tx = pool.begin().await?;
    load_restaurant(&mut tx, restaurant_id).await?;
    let campaign =
        db::campaigns::insert(&mut *tx, snowflake_id(), restaurant_id, data, created_by, now).await?;
    tx.commit().await?;
    Ok(campaign)
}

pub async fn list_campaigns(pool: &PgPool, restaurant_id: i64) -> ServiceResult<Vec<Campaign>> {
    Ok(db::campaigns::list(pool, restaurant_id).await?)
}

/// Address for the channel, if the diner has one
fn recipient_address<'a>(
    channel: NotifyChannel,
    phone: Option<&'a str>,
    email: Option<&'a str>,
) -> Option<&'a str> {
    match channel {
        NotifyChannel::Sms => phone,
        NotifyChannel::Email => email,
    }
    .filter(|a| !a.is_empty())
}

/// Deliver a draft campaign to every diner of the restaurant. The campaign
/// row stays locked while sending so it goes out once.
pub async fn send_campaign(
    pool: &PgPool,
    notifier: &dyn Notifier,
    restaurant_id: i64,
    campaign_id: i64,
    sent_by: i64,
) -> ServiceResult<Campaign> {
    let mut tx = pool.begin().await?;
    let campaign = db::campaigns::lock(&mut *tx, restaurant_id, campaign_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CampaignNotFound))?;
    if campaign.status == CampaignStatus::Sent {
        return Err(AppError::new(ErrorCode::CampaignAlreadySent).into());
    }
    let restaurant = load_restaurant(&mut tx, restaurant_id).await?;
    let recipients = db::balances::recipients(&mut *tx, restaurant_id).await?;

    let subject = format!("{}: {}", restaurant.name, campaign.name);
    let mut delivered: i32 = 0;
    for (diner_id, phone, email) in &recipients {
        let Some(to) = recipient_address(campaign.channel, phone.as_deref(), email.as_deref())
        else {
            continue;
        };
        let result = match campaign.channel {
            NotifyChannel::Sms => notifier.send_sms(to, &campaign.message).await,
            NotifyChannel::Email => notifier.send_email(to, &subject, &campaign.message).await,
        };
        match result {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(campaign_id, diner_id, error = %e, "Campaign delivery failed"),
        }
    }

    let now = now_millis();
    let campaign = db::campaigns::mark_sent(&mut *tx, campaign.id, delivered, now).await?;
    db::activity::log(
        &mut *tx,
        Some(restaurant_id),
        Some(sent_by),
        "campaign_sent",
        Some(&serde_json::json!({
            "campaign_id": campaign.id,
            "recipients": delivered,
        })),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        campaign_id = campaign.id,
        restaurant_id,
        recipients = delivered,
        "Campaign sent"
    );
    Ok(campaign)
}
