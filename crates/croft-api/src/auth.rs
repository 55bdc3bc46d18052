//! # Authenticator & Role-Based Authorization
//!
//! [`authenticate`] is the pure decision function at the center of the
//! gateway: given the bound tenant scope and a presented credential, it
//! either produces a [`Principal`] or fails with a precise
//! [`AuthError`]. No state is mutated on success — no token refresh, no
//! last-seen bookkeeping.
//!
//! Authorization is layered on top of authentication: routes declare a
//! required role set via `route_layer(from_fn(...))` guards, all of which
//! funnel through one shared set-membership check.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use croft_core::{AuthError, Principal, Role, RoleSet};
use croft_state::{CredentialStore, TenantScope};

use crate::error::AppError;

// ── Authentication ──────────────────────────────────────────────────

/// Authenticate a presented credential within the bound tenant scope.
///
/// Step order is load-bearing:
///
/// 1. A missing or empty token fails with [`AuthError::MissingCredential`]
///    before any store lookup happens.
/// 2. The credential store is consulted within the bound scope only;
///    no match is [`AuthError::InvalidCredential`].
/// 3. A matched but stale token is [`AuthError::ExpiredCredential`].
/// 4. Otherwise the resolved user becomes the [`Principal`].
pub fn authenticate(
    store: &CredentialStore,
    scope: &TenantScope,
    token: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = match token {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(AuthError::MissingCredential),
    };

    let (user, record) = store
        .find_by_token(scope, token)
        .map_err(|_| AuthError::InvalidCredential)?;

    if store.is_expired(&record) {
        return Err(AuthError::ExpiredCredential);
    }

    Ok(Principal::from_user(&user))
}

// ── CurrentUser extractor ───────────────────────────────────────────

/// The authenticated principal, as a handler argument.
///
/// Wraps [`Principal`] so the extractor can live in this crate; the auth
/// middleware injects the principal into request extensions, and
/// handlers unwrap it with `CurrentUser(principal): CurrentUser`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// Returns 401 if no principal is present (the auth middleware didn't
/// run or rejected the request before dispatch).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

// ── Authorization ───────────────────────────────────────────────────

/// Check that the principal's role set intersects the requirement.
/// An empty requirement admits any authenticated principal.
pub fn require_roles(principal: &Principal, required: &RoleSet) -> Result<(), AppError> {
    if principal.satisfies(required) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "requires one of [{required}], principal has [{}]",
            principal.roles
        )))
    }
}

/// Shared role-guard middleware body. The route guards below differ only
/// in the required set.
async fn enforce_roles(required: RoleSet, request: Request, next: Next) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return AppError::Unauthorized.into_response();
    };
    match require_roles(principal, &required) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Route guard: admin only.
pub async fn admin_required(request: Request, next: Next) -> Response {
    enforce_roles(RoleSet::of([Role::Admin]), request, next).await
}

/// Route guard: billing only.
pub async fn billing_required(request: Request, next: Next) -> Response {
    enforce_roles(RoleSet::of([Role::Billing]), request, next).await
}

/// Route guard: anyone who can write widgets (member or admin).
pub async fn widget_writer_required(request: Request, next: Next) -> Response {
    enforce_roles(RoleSet::of([Role::Member, Role::Admin]), request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use croft_core::{OpaqueToken, Tenant, TenantSlug, Token, UserId};
    use croft_state::{TokenValidity, UserStore};

    fn scope(slug: &str) -> TenantScope {
        let tenant = Tenant::new(TenantSlug::new(slug).unwrap(), slug.to_uppercase());
        TenantScope::for_tenant(&tenant)
    }

    fn store_with_ttl(hours: i64) -> CredentialStore {
        CredentialStore::new(UserStore::new(), TokenValidity::hours(hours))
    }

    fn seeded_user(
        store: &CredentialStore,
        scope: &TenantScope,
        name: &str,
        roles: RoleSet,
    ) -> croft_core::User {
        store.users().create(scope, name, "pw", roles).unwrap()
    }

    #[test]
    fn valid_token_yields_matching_principal() {
        let store = store_with_ttl(24);
        let acme = scope("acme");
        let alice = seeded_user(&store, &acme, "alice", RoleSet::of([Role::Admin]));
        let token = store.issue(&acme, &alice);

        let principal = authenticate(&store, &acme, Some(token.value.as_str())).unwrap();
        assert_eq!(principal.user_id, alice.id);
        assert_eq!(principal.tenant_id, acme.tenant_id());
        assert!(principal.roles.contains(Role::Admin));
    }

    #[test]
    fn missing_token_fails_before_lookup() {
        let store = store_with_ttl(24);
        let acme = scope("acme");

        assert_eq!(
            authenticate(&store, &acme, None).unwrap_err(),
            AuthError::MissingCredential
        );
    }

    #[test]
    fn empty_token_is_missing_not_invalid() {
        let store = store_with_ttl(24);
        let acme = scope("acme");

        for empty in ["", "   "] {
            assert_eq!(
                authenticate(&store, &acme, Some(empty)).unwrap_err(),
                AuthError::MissingCredential
            );
        }
    }

    #[test]
    fn unknown_token_is_invalid() {
        let store = store_with_ttl(24);
        let acme = scope("acme");

        assert_eq!(
            authenticate(&store, &acme, Some("no-such-token")).unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[test]
    fn expired_token_is_expired_never_invalid() {
        let store = store_with_ttl(1);
        let acme = scope("acme");
        let alice = seeded_user(&store, &acme, "alice", RoleSet::new());

        let stale = Token {
            value: OpaqueToken::generate(),
            user_id: alice.id,
            tenant_id: acme.tenant_id(),
            issued_at: Utc::now() - Duration::hours(2),
            expires_at: None,
        };
        store.insert(&acme, stale.clone());

        assert_eq!(
            authenticate(&store, &acme, Some(stale.value.as_str())).unwrap_err(),
            AuthError::ExpiredCredential
        );
    }

    #[test]
    fn token_from_other_tenant_is_invalid() {
        let store = store_with_ttl(24);
        let acme = scope("acme");
        let globex = scope("globex");
        let alice = seeded_user(&store, &acme, "alice", RoleSet::new());
        let token = store.issue(&acme, &alice);

        assert_eq!(
            authenticate(&store, &globex, Some(token.value.as_str())).unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[test]
    fn authenticate_mutates_nothing() {
        let store = store_with_ttl(24);
        let acme = scope("acme");
        let alice = seeded_user(&store, &acme, "alice", RoleSet::new());
        let token = store.issue(&acme, &alice);

        let before = store.len(&acme);
        authenticate(&store, &acme, Some(token.value.as_str())).unwrap();
        authenticate(&store, &acme, Some("wrong")).unwrap_err();
        assert_eq!(store.len(&acme), before);
    }

    #[test]
    fn require_roles_checks_intersection() {
        let principal = Principal {
            user_id: UserId::new(),
            tenant_id: croft_core::TenantId::new(),
            roles: RoleSet::of([Role::Admin]),
        };
        assert!(require_roles(&principal, &RoleSet::of([Role::Admin])).is_ok());
        assert!(require_roles(&principal, &RoleSet::of([Role::Admin, Role::Billing])).is_ok());
        assert!(require_roles(&principal, &RoleSet::of([Role::Billing])).is_err());
    }

    #[test]
    fn require_roles_empty_requirement_admits_all() {
        let principal = Principal {
            user_id: UserId::new(),
            tenant_id: croft_core::TenantId::new(),
            roles: RoleSet::new(),
        };
        assert!(require_roles(&principal, &RoleSet::new()).is_ok());
    }
}
