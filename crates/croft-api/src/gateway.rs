//! # Tenant-Scoped Authentication Gateway
//!
//! The request interceptor in front of every business route. Per request
//! the gateway progresses
//!
//! ```text
//! Received → TenantResolved → ScopeBound → Authenticated → Dispatched → ScopeReleased
//! ```
//!
//! with an error absorbing state reachable from every non-terminal stage:
//!
//! - tenant resolution fails → 404 `TENANT_NOT_FOUND`
//! - scope bind fails → 500 `BIND_FAILURE` (logged with full context)
//! - authentication fails → opaque 401 (reason logged, never returned)
//! - handler outcome, success or fault → scope released, always
//!
//! The flow is split across two composable middlewares so the session
//! login route can run tenant-scoped without a token:
//!
//! - [`tenant_scope_middleware`] — stages Received → TenantResolved →
//!   ScopeBound; owns the [`ScopeGuard`] across handler dispatch, so
//!   release is RAII on every exit path, panic unwind included.
//! - [`auth_middleware`] — stage ScopeBound → Authenticated; attaches the
//!   [`Principal`] to request extensions.
//!
//! There is no shared "current tenant" anywhere: the binding lives in the
//! request's own extensions and middleware frame. Concurrent requests
//! cannot observe each other's scope by construction.

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use croft_core::Tenant;
use croft_state::{ScopeGuard, TenantScope};

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying an explicit tenant hint. Takes precedence over the
/// `Host` header.
pub const TENANT_HEADER: &str = "x-tenant-id";

// ── RequestContext ──────────────────────────────────────────────────

/// Per-request context: the resolved tenant and the bound scope view.
///
/// One per in-flight request, inserted by [`tenant_scope_middleware`],
/// never shared across requests, never mutated after handler dispatch
/// begins. Handlers extract it via `FromRequestParts`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    tenant: Tenant,
    scope: TenantScope,
}

impl RequestContext {
    /// The resolved tenant.
    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    /// The bound scope view for data operations.
    pub fn scope(&self) -> &TenantScope {
        &self.scope
    }
}

/// Extracts the context the gateway injected into extensions. A missing
/// context means the route was mounted outside the gateway — an internal
/// wiring fault, not a caller error.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal("no request context in extensions".into()))
    }
}

// ── Hint & credential extraction ────────────────────────────────────

/// Extract the tenant hint from request metadata.
///
/// The explicit `X-Tenant-Id` header wins; otherwise the leftmost label
/// of the `Host` header (subdomain routing). Returns `None` when neither
/// is usable.
pub fn tenant_hint(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(TENANT_HEADER).and_then(|v| v.to_str().ok()) {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok())?;
    let host = host.rsplit_once(':').map_or(host, |(h, _)| h);
    let label = host.split('.').next()?.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// Anything other than a well-formed `Bearer <token>` value — absent
/// header, other scheme, empty token — is `None`; the authenticator
/// treats it as a missing credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// ── Middlewares ─────────────────────────────────────────────────────

/// Stages Received → TenantResolved → ScopeBound, then dispatches and
/// releases.
///
/// The [`ScopeGuard`] is held across `next.run`, so the binding is
/// released on every exit path: normal response, error response from an
/// inner middleware or handler, and panic unwind (guard drops with the
/// future).
pub async fn tenant_scope_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Received → TenantResolved
    let Some(hint) = tenant_hint(request.headers()) else {
        tracing::warn!("tenant resolution failed: no hint in request metadata");
        return AppError::TenantNotFound("<none>".to_string()).into_response();
    };

    let tenant = match state.directory.resolve(&hint) {
        Ok(tenant) => tenant,
        Err(err) => {
            tracing::warn!(hint = %hint, "tenant resolution failed");
            return AppError::from(err).into_response();
        }
    };

    // TenantResolved → ScopeBound
    let guard = match ScopeGuard::bind(&state.binder, &tenant) {
        Ok(guard) => guard,
        Err(err) => {
            tracing::error!(
                tenant = %tenant.slug,
                tenant_id = %tenant.id,
                error = %err,
                "scope bind failed"
            );
            return AppError::from(err).into_response();
        }
    };

    request.extensions_mut().insert(RequestContext {
        tenant,
        scope: guard.view(),
    });

    // Dispatched → ScopeReleased: the guard drops when this frame
    // unwinds, whatever the handler did.
    next.run(request).await
}

/// Stage ScopeBound → Authenticated.
///
/// Runs inside [`tenant_scope_middleware`]; on failure the 401 returns
/// through the outer middleware, which releases the scope before the
/// response leaves the gateway.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(ctx) = request.extensions().get::<RequestContext>().cloned() else {
        return AppError::Internal("auth middleware ran without tenant scope".into())
            .into_response();
    };

    let token = bearer_token(request.headers());
    match auth::authenticate(&state.credentials, ctx.scope(), token.as_deref()) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                tenant = %ctx.tenant().slug,
                reason = err.as_str(),
                "authentication failed"
            );
            AppError::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    // ── tenant_hint ──────────────────────────────────────────────

    #[test]
    fn hint_prefers_explicit_header() {
        let h = headers(&[("x-tenant-id", "acme"), ("host", "globex.example.com")]);
        assert_eq!(tenant_hint(&h).as_deref(), Some("acme"));
    }

    #[test]
    fn hint_falls_back_to_host_subdomain() {
        let h = headers(&[("host", "acme.example.com")]);
        assert_eq!(tenant_hint(&h).as_deref(), Some("acme"));
    }

    #[test]
    fn hint_strips_port_from_host() {
        let h = headers(&[("host", "acme.example.com:8080")]);
        assert_eq!(tenant_hint(&h).as_deref(), Some("acme"));
    }

    #[test]
    fn hint_ignores_blank_header_value() {
        let h = headers(&[("x-tenant-id", "  "), ("host", "acme.example.com")]);
        assert_eq!(tenant_hint(&h).as_deref(), Some("acme"));
    }

    #[test]
    fn hint_missing_everything_is_none() {
        assert_eq!(tenant_hint(&HeaderMap::new()), None);
    }

    // ── bearer_token ─────────────────────────────────────────────

    #[test]
    fn bearer_extracted_from_authorization() {
        let h = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(bearer_token(&h).as_deref(), Some("abc123"));
    }

    #[test]
    fn bearer_missing_header_is_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_other_scheme_is_none() {
        let h = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(bearer_token(&h), None);
    }

    #[test]
    fn bearer_empty_token_is_none() {
        let h = headers(&[("authorization", "Bearer   ")]);
        assert_eq!(bearer_token(&h), None);
    }
}
