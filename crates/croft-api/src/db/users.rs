//! User persistence operations.
//!
//! All functions are partition-addressed: the scope's tenant id is bound
//! in every query.

use chrono::{DateTime, Utc};
use croft_core::{RoleSet, TenantId, User, UserId};
use croft_state::TenantScope;
use sqlx::PgPool;
use uuid::Uuid;

/// Serialize a role set to the JSONB `roles` column.
fn serialize_roles(roles: &RoleSet) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(roles).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize role set");
        sqlx::Error::Encode(Box::new(e))
    })
}

/// Insert a new user row under the scope's tenant.
pub async fn insert(pool: &PgPool, scope: &TenantScope, user: &User) -> Result<(), sqlx::Error> {
    let roles = serialize_roles(&user.roles)?;

    sqlx::query(
        "INSERT INTO users (id, tenant_id, username, credential_hash, roles, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user.id.as_uuid())
    .bind(scope.tenant_id().as_uuid())
    .bind(&user.username)
    .bind(&user.credential_hash)
    .bind(&roles)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the scope's tenant's users on startup.
pub async fn load_for_tenant(
    pool: &PgPool,
    scope: &TenantScope,
) -> Result<Vec<User>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, tenant_id, username, credential_hash, roles, created_at
         FROM users WHERE tenant_id = $1 ORDER BY created_at",
    )
    .bind(scope.tenant_id().as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    username: String,
    credential_hash: String,
    roles: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> User {
        let roles: RoleSet = serde_json::from_value(self.roles.clone()).unwrap_or_else(|e| {
            tracing::error!(
                id = %self.id,
                error = %e,
                "unknown roles in database — defaulting to no roles; investigate"
            );
            RoleSet::new()
        });

        User {
            id: UserId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            username: self.username,
            credential_hash: self.credential_hash,
            roles,
            created_at: self.created_at,
        }
    }
}
