//! # Postgres Persistence
//!
//! Optional durable persistence behind the in-memory stores. When
//! `DATABASE_URL` is set, writes go through to Postgres and the stores
//! hydrate from it on startup; otherwise the API runs in-memory only.
//!
//! ## Tenant scoping
//!
//! Every function touching tenant-owned rows takes a
//! [`TenantScope`](croft_state::TenantScope) and binds its tenant id in
//! the query (`WHERE tenant_id = $n`). The scope parameter is this
//! layer's "set active tenant" primitive: there is no session-level
//! current-tenant state to set or forget to clear — the filter travels
//! with every call, and goes away when the request's scope guard drops.

pub mod tenants;
pub mod tokens;
pub mod users;
pub mod widgets;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Initialize the connection pool from `DATABASE_URL`.
///
/// Absent or empty `DATABASE_URL` means in-memory-only mode (`Ok(None)`),
/// not an error. A set-but-unreachable database is an error: silently
/// dropping durability a deployment asked for would be worse than
/// failing the boot.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::info!("DATABASE_URL not set — running in-memory only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    ensure_schema(&pool).await?;
    tracing::info!("database connected and schema ensured");
    Ok(Some(pool))
}

/// Create tables if they do not exist.
async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tenants (
             id            UUID PRIMARY KEY,
             slug          TEXT NOT NULL UNIQUE,
             display_name  TEXT NOT NULL,
             partition_key TEXT NOT NULL,
             created_at    TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
             id              UUID PRIMARY KEY,
             tenant_id       UUID NOT NULL REFERENCES tenants(id),
             username        TEXT NOT NULL,
             credential_hash TEXT NOT NULL,
             roles           JSONB NOT NULL,
             created_at      TIMESTAMPTZ NOT NULL,
             UNIQUE (tenant_id, username)
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tokens (
             value      TEXT NOT NULL,
             tenant_id  UUID NOT NULL REFERENCES tenants(id),
             user_id    UUID NOT NULL REFERENCES users(id),
             issued_at  TIMESTAMPTZ NOT NULL,
             expires_at TIMESTAMPTZ,
             PRIMARY KEY (tenant_id, value)
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS widgets (
             id         UUID PRIMARY KEY,
             tenant_id  UUID NOT NULL REFERENCES tenants(id),
             name       TEXT NOT NULL,
             notes      TEXT,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
