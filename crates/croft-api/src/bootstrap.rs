//! # Bootstrap — Seed-File Provisioning
//!
//! Tenant and user provisioning happens at startup from a JSON seed
//! file, not over HTTP (there is no cross-tenant admin surface). The
//! seed is applied idempotently: tenants and users that already exist —
//! typically because the database hydrated them first — are skipped.
//!
//! ```json
//! {
//!   "tenants": [
//!     {
//!       "slug": "acme",
//!       "display_name": "Acme Corp",
//!       "users": [
//!         { "username": "alice", "password": "...", "roles": ["admin"] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Seed users are created under a bound scope, through the same
//! [`ScopeGuard`] path every request uses — provisioning is not special.

use std::path::Path;

use croft_core::{RoleSet, Tenant, TenantSlug};
use croft_state::{DirectoryError, ScopeGuard, UserError};
use serde::Deserialize;
use thiserror::Error;

use crate::db;
use crate::state::AppState;

/// Seed file root.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    /// Tenants to provision.
    pub tenants: Vec<SeedTenant>,
}

/// One tenant in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedTenant {
    /// Tenant slug (the resolution hint).
    pub slug: String,
    /// Display name.
    pub display_name: String,
    /// Users to provision under this tenant.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// One user in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    /// Login name.
    pub username: String,
    /// Plaintext password — hashed before storage. Seed files are a
    /// deployment input; treat them like any other secret material.
    pub password: String,
    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Bootstrap failure.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Seed file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file could not be parsed.
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A seed entry failed validation (bad slug or role name).
    #[error("invalid seed entry: {0}")]
    Validation(#[from] croft_core::ValidationError),

    /// Tenant registration failed.
    #[error("failed to register seed tenant: {0}")]
    Directory(#[from] DirectoryError),

    /// Scope binding failed while provisioning.
    #[error("failed to bind provisioning scope: {0}")]
    Bind(#[from] croft_state::BindError),

    /// User creation failed for a reason other than duplication.
    #[error("failed to create seed user: {0}")]
    User(#[from] UserError),
}

/// What a seed application actually did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Tenants newly registered.
    pub tenants_created: usize,
    /// Users newly created.
    pub users_created: usize,
}

/// Read and apply a seed file.
pub async fn bootstrap(state: &AppState, path: &Path) -> Result<SeedSummary, BootstrapError> {
    let raw = std::fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&raw)?;
    let summary = apply_seed(state, seed).await?;
    tracing::info!(
        tenants = summary.tenants_created,
        users = summary.users_created,
        seed = %path.display(),
        "seed applied"
    );
    Ok(summary)
}

/// Apply a parsed seed to the application state, idempotently.
pub async fn apply_seed(state: &AppState, seed: SeedFile) -> Result<SeedSummary, BootstrapError> {
    let mut summary = SeedSummary::default();

    for seed_tenant in seed.tenants {
        let slug = TenantSlug::new(&seed_tenant.slug)?;

        let tenant = if let Ok(existing) = state.directory.resolve(slug.as_str()) {
            tracing::debug!(tenant = %slug, "seed tenant already registered — skipping");
            existing
        } else {
            let tenant = Tenant::new(slug.clone(), seed_tenant.display_name);
            state.directory.register(tenant.clone())?;
            summary.tenants_created += 1;

            if let Some(pool) = &state.db_pool {
                if let Err(e) = db::tenants::insert(pool, &tenant).await {
                    tracing::error!(error = %e, tenant = %tenant.slug, "failed to persist seed tenant");
                }
            }
            tenant
        };

        let guard = ScopeGuard::bind(&state.binder, &tenant)?;
        let scope = guard.view();

        for seed_user in seed_tenant.users {
            let roles = RoleSet::parse(&seed_user.roles)?;
            match state
                .users
                .create(&scope, &seed_user.username, &seed_user.password, roles)
            {
                Ok(user) => {
                    summary.users_created += 1;
                    if let Some(pool) = &state.db_pool {
                        if let Err(e) = db::users::insert(pool, &scope, &user).await {
                            tracing::error!(error = %e, user = %user.username, "failed to persist seed user");
                        }
                    }
                }
                Err(UserError::DuplicateUsername(name)) => {
                    tracing::debug!(tenant = %tenant.slug, user = %name, "seed user already exists — skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use croft_core::Role;

    fn seed_json() -> SeedFile {
        serde_json::from_str(
            r#"{
                "tenants": [
                    {
                        "slug": "acme",
                        "display_name": "Acme Corp",
                        "users": [
                            { "username": "alice", "password": "correct horse", "roles": ["admin"] },
                            { "username": "bob", "password": "battery staple", "roles": ["member"] }
                        ]
                    },
                    { "slug": "globex", "display_name": "Globex" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn apply_seed_provisions_tenants_and_users() {
        let state = AppState::new();
        let summary = apply_seed(&state, seed_json()).await.unwrap();

        assert_eq!(summary.tenants_created, 2);
        assert_eq!(summary.users_created, 2);

        let acme = state.directory.resolve("acme").unwrap();
        let guard = ScopeGuard::bind(&state.binder, &acme).unwrap();
        let alice = state
            .users
            .find_by_username(&guard.view(), "alice")
            .unwrap();
        assert!(alice.roles.contains(Role::Admin));
    }

    #[tokio::test]
    async fn apply_seed_is_idempotent() {
        let state = AppState::new();
        apply_seed(&state, seed_json()).await.unwrap();
        let second = apply_seed(&state, seed_json()).await.unwrap();

        assert_eq!(second, SeedSummary::default());
        assert_eq!(state.directory.len(), 2);
    }

    #[tokio::test]
    async fn apply_seed_releases_provisioning_scopes() {
        let state = AppState::new();
        apply_seed(&state, seed_json()).await.unwrap();
        assert_eq!(state.binder.active_bindings(), 0);
    }

    #[tokio::test]
    async fn apply_seed_rejects_bad_slug() {
        let state = AppState::new();
        let seed: SeedFile =
            serde_json::from_str(r#"{"tenants":[{"slug":"Not Valid","display_name":"X"}]}"#)
                .unwrap();
        assert!(matches!(
            apply_seed(&state, seed).await.unwrap_err(),
            BootstrapError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn apply_seed_rejects_bad_role() {
        let state = AppState::new();
        let seed: SeedFile = serde_json::from_str(
            r#"{"tenants":[{"slug":"acme","display_name":"Acme",
                "users":[{"username":"alice","password":"pw123456","roles":["root"]}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            apply_seed(&state, seed).await.unwrap_err(),
            BootstrapError::Validation(_)
        ));
    }
}
