//! # croft-api — Axum HTTP Layer for Croft
//!
//! Croft is a multi-tenant REST backend. Every business route sits
//! behind the tenant-scoped authentication gateway: tenant resolution,
//! scope binding, token authentication, and principal attachment all
//! happen before a handler runs, and the bound scope is released on
//! every exit path.
//!
//! ## API Surface
//!
//! | Prefix                | Module               | Access                   |
//! |-----------------------|----------------------|--------------------------|
//! | `/v1/widgets/*`       | [`routes::widgets`]  | authenticated (writes: member/admin) |
//! | `/v1/users/*`         | [`routes::users`]    | admin                    |
//! | `/v1/session`         | [`routes::session`]  | tenant-scoped, tokenless |
//! | `/v1/billing/summary` | [`routes::billing`]  | billing                  |
//! | `/health/*`           | (this module)        | public                   |
//! | `/openapi.json`       | [`openapi`]          | public                   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → Metrics → TenantScope → RateLimit → Auth → Handler
//! ```
//!
//! The session routes stop after RateLimit; everything under `/v1`
//! except `/v1/session` also passes Auth.

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;

use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and the OpenAPI spec are mounted outside the gateway so
/// they remain accessible without a tenant or credentials.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(RateLimitConfig::default());

    // Token-authenticated routes.
    let protected = Router::new()
        .merge(routes::widgets::router())
        .merge(routes::users::router())
        .merge(routes::billing::router())
        .layer(from_fn_with_state(state.clone(), gateway::auth_middleware));

    // Everything tenant-scoped: the protected routes plus session
    // login/logout.
    let api = Router::new()
        .merge(protected)
        .merge(routes::session::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            gateway::tenant_scope_middleware,
        ))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state);

    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(openapi::router())
        .merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
