//! Token persistence operations.
//!
//! All functions are partition-addressed: the scope's tenant id is bound
//! in every query, so a revocation or load can only ever touch the bound
//! tenant's tokens.

use chrono::{DateTime, Utc};
use croft_core::{OpaqueToken, TenantId, Token, UserId};
use croft_state::TenantScope;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a newly issued token under the scope's tenant.
pub async fn insert(pool: &PgPool, scope: &TenantScope, token: &Token) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tokens (value, tenant_id, user_id, issued_at, expires_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(token.value.as_str())
    .bind(scope.tenant_id().as_uuid())
    .bind(token.user_id.as_uuid())
    .bind(token.issued_at)
    .bind(token.expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a revoked token under the scope's tenant. Returns whether a
/// row was removed.
pub async fn delete(
    pool: &PgPool,
    scope: &TenantScope,
    value: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens WHERE tenant_id = $1 AND value = $2")
        .bind(scope.tenant_id().as_uuid())
        .bind(value)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load the scope's tenant's tokens on startup.
pub async fn load_for_tenant(
    pool: &PgPool,
    scope: &TenantScope,
) -> Result<Vec<Token>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TokenRow>(
        "SELECT value, tenant_id, user_id, issued_at, expires_at
         FROM tokens WHERE tenant_id = $1 ORDER BY issued_at",
    )
    .bind(scope.tenant_id().as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TokenRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TokenRow {
    value: String,
    tenant_id: Uuid,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenRow {
    fn into_record(self) -> Token {
        Token {
            value: OpaqueToken::from_string(self.value),
            user_id: UserId::from_uuid(self.user_id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
        }
    }
}
