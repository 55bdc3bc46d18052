//! # Domain Records
//!
//! The persistent data model (Tenant, User, Token, Widget) and the
//! ephemeral [`Principal`] attached to a request after authentication.
//!
//! Tenants are immutable after creation: the gateway looks them up, it
//! never mutates them. Users and tokens are owned by exactly one tenant;
//! the credential store enforces that ownership on every lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{PartitionKey, TenantId, TenantSlug, UserId, WidgetId};
use crate::role::RoleSet;
use crate::token::OpaqueToken;

/// An isolated customer partition of data within a shared deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: TenantId,
    /// Routable tenant name — the resolution hint.
    pub slug: TenantSlug,
    /// Human-readable display name.
    pub display_name: String,
    /// Physical partition descriptor data operations route to.
    pub partition: PartitionKey,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a tenant with a fresh id and a partition key derived from
    /// the slug.
    pub fn new(slug: TenantSlug, display_name: impl Into<String>) -> Self {
        let partition = PartitionKey::for_slug(&slug);
        Self {
            id: TenantId::new(),
            slug,
            display_name: display_name.into(),
            partition,
            created_at: Utc::now(),
        }
    }
}

/// A user owned by a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Login name, unique per tenant.
    pub username: String,
    /// Argon2id password hash in PHC string format. Never a plaintext
    /// password.
    pub credential_hash: String,
    /// Roles held within the tenant.
    pub roles: RoleSet,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An issued bearer token.
///
/// Created on login, read on every authenticated request, revoked on
/// logout. Unique by string value within its tenant partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// The opaque credential value.
    pub value: OpaqueToken,
    /// Owning user.
    pub user_id: UserId,
    /// Tenant the token was issued under. A token never authenticates
    /// outside this tenant.
    pub tenant_id: TenantId,
    /// Issue time — the anchor for window-based expiry.
    pub issued_at: DateTime<Utc>,
    /// Optional explicit expiry overriding the configured validity window.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A widget — the minimal business entity the gateway protects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    /// Unique widget identifier.
    pub id: WidgetId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Widget name.
    pub name: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated identity attached to a request.
///
/// Constructed by the authenticator from the resolved user; immutable
/// once handler dispatch begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user.
    pub user_id: UserId,
    /// Tenant the request is bound to.
    pub tenant_id: TenantId,
    /// The user's roles at authentication time.
    pub roles: RoleSet,
}

impl Principal {
    /// Build a principal from a resolved user.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            roles: user.roles.clone(),
        }
    }

    /// Whether this principal satisfies the required role set.
    ///
    /// An empty requirement admits any authenticated principal.
    pub fn satisfies(&self, required: &RoleSet) -> bool {
        required.is_empty() || self.roles.intersects(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn tenant() -> Tenant {
        Tenant::new(TenantSlug::new("acme").unwrap(), "Acme Corp")
    }

    fn user_in(tenant: &Tenant, roles: RoleSet) -> User {
        User {
            id: UserId::new(),
            tenant_id: tenant.id,
            username: "alice".to_string(),
            credential_hash: "$argon2id$stub".to_string(),
            roles,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tenant_partition_derived_from_slug() {
        let t = tenant();
        assert_eq!(t.partition.as_str(), "tenant_acme");
    }

    #[test]
    fn principal_carries_user_and_tenant_ids() {
        let t = tenant();
        let u = user_in(&t, RoleSet::of([Role::Admin]));
        let p = Principal::from_user(&u);
        assert_eq!(p.user_id, u.id);
        assert_eq!(p.tenant_id, t.id);
    }

    #[test]
    fn principal_satisfies_intersecting_requirement() {
        let t = tenant();
        let u = user_in(&t, RoleSet::of([Role::Admin, Role::Member]));
        let p = Principal::from_user(&u);
        assert!(p.satisfies(&RoleSet::of([Role::Admin])));
        assert!(p.satisfies(&RoleSet::of([Role::Member, Role::Billing])));
        assert!(!p.satisfies(&RoleSet::of([Role::Billing])));
    }

    #[test]
    fn empty_requirement_admits_any_principal() {
        let t = tenant();
        let u = user_in(&t, RoleSet::new());
        let p = Principal::from_user(&u);
        assert!(p.satisfies(&RoleSet::new()));
    }
}
