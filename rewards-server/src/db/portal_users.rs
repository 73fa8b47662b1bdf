//! Restaurant portal memberships

use shared::models::{PortalRole, PortalUser, PortalUserDetail, PortalUserUpdate};
use sqlx::PgExecutor;

pub async fn find_active(
    conn: impl PgExecutor<'_>,
    user_id: i64,
    restaurant_id: i64,
) -> Result<Option<PortalUser>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM portal_users WHERE user_id = $1 AND restaurant_id = $2 AND is_active",
    )
    .bind(user_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

pub async fn list(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<Vec<PortalUserDetail>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT pu.*, u.email, u.name
        FROM portal_users pu
        JOIN users u ON u.id = pu.user_id
        WHERE pu.restaurant_id = $1
        ORDER BY pu.created_at
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(conn)
    .await
}

/// Insert a membership; `None` if the user already belongs to the restaurant.
pub async fn insert(
    conn: impl PgExecutor<'_>,
    id: i64,
    user_id: i64,
    restaurant_id: i64,
    role: PortalRole,
    branch_id: Option<i64>,
    now: i64,
) -> Result<Option<PortalUser>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO portal_users (id, user_id, restaurant_id, role, branch_id, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        ON CONFLICT (user_id, restaurant_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(restaurant_id)
    .bind(role)
    .bind(branch_id)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub async fn update(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    portal_user_id: i64,
    data: &PortalUserUpdate,
    now: i64,
) -> Result<Option<PortalUser>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE portal_users SET
            role = COALESCE($1, role),
            branch_id = COALESCE($2, branch_id),
            is_active = COALESCE($3, is_active),
            updated_at = $4
        WHERE id = $5 AND restaurant_id = $6
        RETURNING *
        "#,
    )
    .bind(data.role)
    .bind(data.branch_id)
    .bind(data.is_active)
    .bind(now)
    .bind(portal_user_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

pub async fn count_active_owners(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM portal_users WHERE restaurant_id = $1 AND role = 'owner' AND is_active",
    )
    .bind(restaurant_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn find(
    conn: impl PgExecutor<'_>,
    restaurant_id: i64,
    portal_user_id: i64,
) -> Result<Option<PortalUser>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM portal_users WHERE id = $1 AND restaurant_id = $2")
        .bind(portal_user_id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}
