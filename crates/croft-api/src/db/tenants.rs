//! Tenant persistence operations.
//!
//! Tenants are the one global table — they are what scopes point at, so
//! these functions take no scope parameter.

use chrono::{DateTime, Utc};
use croft_core::{PartitionKey, Tenant, TenantId, TenantSlug};
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new tenant row.
pub async fn insert(pool: &PgPool, tenant: &Tenant) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tenants (id, slug, display_name, partition_key, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(tenant.id.as_uuid())
    .bind(tenant.slug.as_str())
    .bind(&tenant.display_name)
    .bind(tenant.partition.as_str())
    .bind(tenant.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all tenants on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Tenant>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TenantRow>(
        "SELECT id, slug, display_name, created_at FROM tenants ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(TenantRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    slug: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    /// Rebuild the domain record. A row whose slug no longer validates is
    /// skipped with an error log rather than poisoning the whole load.
    fn into_record(self) -> Option<Tenant> {
        let slug = match TenantSlug::new(&self.slug) {
            Ok(slug) => slug,
            Err(e) => {
                tracing::error!(
                    id = %self.id,
                    slug = %self.slug,
                    error = %e,
                    "invalid tenant slug in database — skipping row; investigate"
                );
                return None;
            }
        };
        let partition = PartitionKey::for_slug(&slug);
        Some(Tenant {
            id: TenantId::from_uuid(self.id),
            slug,
            display_name: self.display_name,
            partition,
            created_at: self.created_at,
        })
    }
}
