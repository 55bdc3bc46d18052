//! # Credential Store
//!
//! Persists opaque bearer tokens and resolves a presented token string to
//! its owning user — always within the bound tenant's partition.
//!
//! ## Tenant scoping is explicit, not probabilistic
//!
//! Tokens carry enough entropy that a cross-tenant string collision is
//! negligible, but the lookup still consults only the partition named by
//! the caller's [`TenantScope`]: a token issued under tenant A can never
//! resolve under tenant B. Defense in depth, not reliance on entropy.
//!
//! ## Timing
//!
//! Candidate tokens are compared with constant-time equality
//! ([`croft_core::OpaqueToken::matches`]), so scanning a partition leaks
//! no prefix information.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use croft_core::{OpaqueToken, TenantId, Token, User};
use parking_lot::RwLock;
use thiserror::Error;

use crate::scope::TenantScope;
use crate::users::UserStore;

/// Credential lookup failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The presented token matched nothing in the bound tenant's
    /// partition (or its owning user no longer exists).
    #[error("credential not found in bound tenant")]
    NotFound,
}

/// Configured token validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenValidity {
    window: Duration,
}

impl TokenValidity {
    /// A validity window of the given number of seconds.
    pub fn seconds(secs: i64) -> Self {
        Self {
            window: Duration::seconds(secs),
        }
    }

    /// A validity window of the given number of hours.
    pub fn hours(hours: i64) -> Self {
        Self {
            window: Duration::hours(hours),
        }
    }

    /// Whether `token` is expired at `now`.
    ///
    /// A token's explicit `expires_at` takes precedence; otherwise expiry
    /// is `issued_at` plus this window.
    pub fn is_expired_at(&self, token: &Token, now: DateTime<Utc>) -> bool {
        let deadline = token
            .expires_at
            .unwrap_or_else(|| token.issued_at + self.window);
        now >= deadline
    }
}

impl Default for TokenValidity {
    /// 24 hours.
    fn default() -> Self {
        Self::hours(24)
    }
}

/// Tenant-partitioned token store.
///
/// Clone-friendly: clones share the underlying partitions and user store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    tokens: Arc<RwLock<HashMap<TenantId, Vec<Token>>>>,
    users: UserStore,
    validity: TokenValidity,
}

impl CredentialStore {
    /// Create a store over the given user store and validity window.
    pub fn new(users: UserStore, validity: TokenValidity) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            users,
            validity,
        }
    }

    /// Issue a fresh token for `user` under the bound tenant.
    pub fn issue(&self, scope: &TenantScope, user: &User) -> Token {
        let token = Token {
            value: OpaqueToken::generate(),
            user_id: user.id,
            tenant_id: scope.tenant_id(),
            issued_at: Utc::now(),
            expires_at: None,
        };
        self.insert(scope, token.clone());
        token
    }

    /// Insert an existing token into the bound tenant's partition
    /// (hydration path).
    pub fn insert(&self, scope: &TenantScope, token: Token) {
        self.tokens
            .write()
            .entry(scope.tenant_id())
            .or_default()
            .push(token);
    }

    /// Resolve a presented token string to its user and token record,
    /// consulting only the bound tenant's partition.
    pub fn find_by_token(
        &self,
        scope: &TenantScope,
        presented: &str,
    ) -> Result<(User, Token), CredentialError> {
        let token = {
            let guard = self.tokens.read();
            guard
                .get(&scope.tenant_id())
                .and_then(|partition| {
                    partition
                        .iter()
                        .find(|t| t.value.matches(presented))
                        .cloned()
                })
                .ok_or(CredentialError::NotFound)?
        };

        let user = self
            .users
            .get(scope, &token.user_id)
            .ok_or(CredentialError::NotFound)?;

        Ok((user, token))
    }

    /// Whether `token` is expired now, per the configured validity window.
    pub fn is_expired(&self, token: &Token) -> bool {
        self.validity.is_expired_at(token, Utc::now())
    }

    /// Revoke (delete) a token within the bound tenant's partition.
    /// Returns whether a token was removed.
    pub fn revoke(&self, scope: &TenantScope, presented: &str) -> bool {
        let mut guard = self.tokens.write();
        let Some(partition) = guard.get_mut(&scope.tenant_id()) else {
            return false;
        };
        let before = partition.len();
        partition.retain(|t| !t.value.matches(presented));
        partition.len() < before
    }

    /// Number of live tokens in the bound tenant's partition.
    pub fn len(&self, scope: &TenantScope) -> usize {
        self.tokens
            .read()
            .get(&scope.tenant_id())
            .map_or(0, |p| p.len())
    }

    /// Whether the bound tenant's partition holds no tokens.
    pub fn is_empty(&self, scope: &TenantScope) -> bool {
        self.len(scope) == 0
    }

    /// The user store this credential store resolves owners against.
    pub fn users(&self) -> &UserStore {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use croft_core::{RoleSet, Tenant, TenantSlug};

    fn scope(slug: &str) -> TenantScope {
        let tenant = Tenant::new(TenantSlug::new(slug).unwrap(), slug.to_uppercase());
        TenantScope::for_tenant(&tenant)
    }

    fn store() -> CredentialStore {
        CredentialStore::new(UserStore::new(), TokenValidity::hours(24))
    }

    fn user_in(store: &CredentialStore, scope: &TenantScope, name: &str) -> User {
        store
            .users()
            .create(scope, name, "pw", RoleSet::new())
            .unwrap()
    }

    #[test]
    fn issued_token_resolves_to_owner() {
        let store = store();
        let acme = scope("acme");
        let alice = user_in(&store, &acme, "alice");

        let token = store.issue(&acme, &alice);
        let (found_user, found_token) = store.find_by_token(&acme, token.value.as_str()).unwrap();

        assert_eq!(found_user.id, alice.id);
        assert_eq!(found_token.tenant_id, acme.tenant_id());
        assert_eq!(found_token.user_id, alice.id);
    }

    #[test]
    fn unknown_token_is_not_found() {
        let store = store();
        let acme = scope("acme");
        assert_eq!(
            store.find_by_token(&acme, "no-such-token").unwrap_err(),
            CredentialError::NotFound
        );
    }

    #[test]
    fn token_never_resolves_under_other_tenant() {
        let store = store();
        let acme = scope("acme");
        let globex = scope("globex");
        let alice = user_in(&store, &acme, "alice");

        let token = store.issue(&acme, &alice);

        assert_eq!(
            store.find_by_token(&globex, token.value.as_str()).unwrap_err(),
            CredentialError::NotFound
        );
    }

    #[test]
    fn string_equal_tokens_stay_tenant_scoped() {
        // Adversarial construction: the same literal token value exists
        // under both tenants, owned by different users. Each scope must
        // resolve to its own owner.
        let store = store();
        let acme = scope("acme");
        let globex = scope("globex");
        let alice = user_in(&store, &acme, "alice");
        let gus = user_in(&store, &globex, "gus");

        let shared = OpaqueToken::generate();
        let now = Utc::now();
        store.insert(
            &acme,
            Token {
                value: shared.clone(),
                user_id: alice.id,
                tenant_id: acme.tenant_id(),
                issued_at: now,
                expires_at: None,
            },
        );
        store.insert(
            &globex,
            Token {
                value: shared.clone(),
                user_id: gus.id,
                tenant_id: globex.tenant_id(),
                issued_at: now,
                expires_at: None,
            },
        );

        let (acme_user, _) = store.find_by_token(&acme, shared.as_str()).unwrap();
        let (globex_user, _) = store.find_by_token(&globex, shared.as_str()).unwrap();
        assert_eq!(acme_user.id, alice.id);
        assert_eq!(globex_user.id, gus.id);
    }

    #[test]
    fn revoke_removes_token() {
        let store = store();
        let acme = scope("acme");
        let alice = user_in(&store, &acme, "alice");
        let token = store.issue(&acme, &alice);

        assert!(store.revoke(&acme, token.value.as_str()));
        assert!(store.find_by_token(&acme, token.value.as_str()).is_err());
        assert!(!store.revoke(&acme, token.value.as_str()));
    }

    #[test]
    fn revoke_is_tenant_scoped() {
        let store = store();
        let acme = scope("acme");
        let globex = scope("globex");
        let alice = user_in(&store, &acme, "alice");
        let token = store.issue(&acme, &alice);

        // Revoking from the wrong tenant removes nothing.
        assert!(!store.revoke(&globex, token.value.as_str()));
        assert!(store.find_by_token(&acme, token.value.as_str()).is_ok());
    }

    #[test]
    fn window_expiry_uses_issue_time() {
        let validity = TokenValidity::hours(1);
        let now = Utc::now();
        let token = Token {
            value: OpaqueToken::generate(),
            user_id: croft_core::UserId::new(),
            tenant_id: TenantId::new(),
            issued_at: now - Duration::hours(2),
            expires_at: None,
        };
        assert!(validity.is_expired_at(&token, now));
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let validity = TokenValidity::hours(1);
        let now = Utc::now();
        let token = Token {
            value: OpaqueToken::generate(),
            user_id: croft_core::UserId::new(),
            tenant_id: TenantId::new(),
            issued_at: now,
            expires_at: None,
        };
        assert!(!validity.is_expired_at(&token, now + Duration::minutes(30)));
    }

    #[test]
    fn explicit_expiry_overrides_window() {
        let validity = TokenValidity::hours(24);
        let now = Utc::now();
        let token = Token {
            value: OpaqueToken::generate(),
            user_id: croft_core::UserId::new(),
            tenant_id: TenantId::new(),
            issued_at: now,
            expires_at: Some(now + Duration::minutes(5)),
        };
        assert!(!validity.is_expired_at(&token, now));
        assert!(validity.is_expired_at(&token, now + Duration::minutes(6)));
    }
}
