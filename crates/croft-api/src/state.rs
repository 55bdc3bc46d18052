//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! and gateway middleware via the `State` extractor.
//!
//! ## Architecture
//!
//! `AppState` holds the long-lived collaborators: the tenant directory,
//! the scope binder, and the tenant-partitioned stores. Per-request state
//! (resolved tenant, bound scope, principal) never lives here — it
//! travels in request extensions, owned by exactly one request.

use croft_core::{Widget, WidgetId};
use croft_state::{
    CredentialStore, PartitionedStore, ScopeBinder, TenantDirectory, TokenValidity, UserStore,
};
use sqlx::PgPool;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Token validity window in seconds (window-based expiry anchor).
    pub token_ttl_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Shared application state accessible to gateway middleware and route
/// handlers. Clone-friendly via `Arc` internals in each store.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tenant registry the gateway resolves hints against.
    pub directory: TenantDirectory,
    /// The data-scope binder; also the diagnostics surface for active
    /// bindings.
    pub binder: ScopeBinder,
    /// Per-tenant users.
    pub users: UserStore,
    /// Per-tenant bearer tokens.
    pub credentials: CredentialStore,
    /// Per-tenant widgets.
    pub widgets: PartitionedStore<WidgetId, Widget>,

    /// PostgreSQL connection pool for durable persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    /// Configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with default configuration, in-memory
    /// only.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create application state with the given configuration and optional
    /// database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let users = UserStore::new();
        let credentials =
            CredentialStore::new(users.clone(), TokenValidity::seconds(config.token_ttl_secs));
        Self {
            directory: TenantDirectory::new(),
            binder: ScopeBinder::new(),
            users,
            credentials,
            widgets: PartitionedStore::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available. Loads
    /// tenants first, then walks each tenant under a bound scope so that
    /// every per-tenant load is partition-addressed like any other query.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let tenants = crate::db::tenants::load_all(pool)
            .await
            .map_err(|e| format!("failed to load tenants: {e}"))?;
        let tenant_count = tenants.len();

        let mut user_count = 0usize;
        let mut token_count = 0usize;
        let mut widget_count = 0usize;

        for tenant in tenants {
            self.directory
                .register(tenant.clone())
                .map_err(|e| format!("failed to register tenant {}: {e}", tenant.slug))?;

            let guard = croft_state::ScopeGuard::bind(&self.binder, &tenant)
                .map_err(|e| format!("failed to bind hydration scope: {e}"))?;
            let scope = guard.view();

            let users = crate::db::users::load_for_tenant(pool, &scope)
                .await
                .map_err(|e| format!("failed to load users for {}: {e}", tenant.slug))?;
            user_count += users.len();
            for user in users {
                self.users
                    .insert_hashed(&scope, user)
                    .map_err(|e| format!("failed to hydrate user: {e}"))?;
            }

            let tokens = crate::db::tokens::load_for_tenant(pool, &scope)
                .await
                .map_err(|e| format!("failed to load tokens for {}: {e}", tenant.slug))?;
            token_count += tokens.len();
            for token in tokens {
                self.credentials.insert(&scope, token);
            }

            let widgets = crate::db::widgets::load_for_tenant(pool, &scope)
                .await
                .map_err(|e| format!("failed to load widgets for {}: {e}", tenant.slug))?;
            widget_count += widgets.len();
            for widget in widgets {
                self.widgets.insert(&scope, widget.id, widget);
            }
        }

        tracing::info!(
            tenants = tenant_count,
            users = user_count,
            tokens = token_count,
            widgets = widget_count,
            "hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
