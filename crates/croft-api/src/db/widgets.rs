//! Widget persistence operations.
//!
//! All functions are partition-addressed: the scope's tenant id is bound
//! in every query.

use chrono::{DateTime, Utc};
use croft_core::{TenantId, Widget, WidgetId};
use croft_state::TenantScope;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new widget row under the scope's tenant.
pub async fn insert(
    pool: &PgPool,
    scope: &TenantScope,
    widget: &Widget,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO widgets (id, tenant_id, name, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(widget.id.as_uuid())
    .bind(scope.tenant_id().as_uuid())
    .bind(&widget.name)
    .bind(&widget.notes)
    .bind(widget.created_at)
    .bind(widget.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update a widget row under the scope's tenant. Returns whether a row
/// was touched.
pub async fn update(
    pool: &PgPool,
    scope: &TenantScope,
    widget: &Widget,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE widgets SET name = $1, notes = $2, updated_at = $3
         WHERE tenant_id = $4 AND id = $5",
    )
    .bind(&widget.name)
    .bind(&widget.notes)
    .bind(widget.updated_at)
    .bind(scope.tenant_id().as_uuid())
    .bind(widget.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a widget row under the scope's tenant. Returns whether a row
/// was removed.
pub async fn delete(
    pool: &PgPool,
    scope: &TenantScope,
    id: &WidgetId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM widgets WHERE tenant_id = $1 AND id = $2")
        .bind(scope.tenant_id().as_uuid())
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load the scope's tenant's widgets on startup.
pub async fn load_for_tenant(
    pool: &PgPool,
    scope: &TenantScope,
) -> Result<Vec<Widget>, sqlx::Error> {
    let rows = sqlx::query_as::<_, WidgetRow>(
        "SELECT id, tenant_id, name, notes, created_at, updated_at
         FROM widgets WHERE tenant_id = $1 ORDER BY created_at",
    )
    .bind(scope.tenant_id().as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(WidgetRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct WidgetRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WidgetRow {
    fn into_record(self) -> Widget {
        Widget {
            id: WidgetId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            name: self.name,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
