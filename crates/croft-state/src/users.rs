//! # User Store
//!
//! Per-tenant user records with Argon2id password hashing. Usernames are
//! unique within a tenant; the same username under two tenants names two
//! unrelated users.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use croft_core::{RoleSet, User, UserId};
use thiserror::Error;

use crate::scope::TenantScope;
use crate::store::PartitionedStore;

/// User store failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// Username already taken within the tenant.
    #[error("username {0:?} already exists in this tenant")]
    DuplicateUsername(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Tenant-partitioned user store.
///
/// Clone-friendly: clones share the underlying partitions.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    inner: PartitionedStore<UserId, User>,
}

impl UserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// - [`UserError::DuplicateUsername`] if the username exists in the
    ///   scope's partition.
    /// - [`UserError::Hash`] if the KDF rejects the input.
    pub fn create(
        &self,
        scope: &TenantScope,
        username: impl Into<String>,
        password: &str,
        roles: RoleSet,
    ) -> Result<User, UserError> {
        let username = username.into();
        if self.find_by_username(scope, &username).is_some() {
            return Err(UserError::DuplicateUsername(username));
        }

        let salt = SaltString::generate(&mut OsRng);
        let credential_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| UserError::Hash(e.to_string()))?
            .to_string();

        let user = User {
            id: UserId::new(),
            tenant_id: scope.tenant_id(),
            username,
            credential_hash,
            roles,
            created_at: Utc::now(),
        };
        self.inner.insert(scope, user.id, user.clone());
        Ok(user)
    }

    /// Insert a user whose password is already hashed (hydration path).
    ///
    /// # Errors
    ///
    /// Returns [`UserError::DuplicateUsername`] on username collision.
    pub fn insert_hashed(&self, scope: &TenantScope, user: User) -> Result<(), UserError> {
        if self.find_by_username(scope, &user.username).is_some() {
            return Err(UserError::DuplicateUsername(user.username));
        }
        self.inner.insert(scope, user.id, user);
        Ok(())
    }

    /// Fetch a user by id within the scope's partition.
    pub fn get(&self, scope: &TenantScope, id: &UserId) -> Option<User> {
        self.inner.get(scope, id)
    }

    /// Find a user by username within the scope's partition.
    pub fn find_by_username(&self, scope: &TenantScope, username: &str) -> Option<User> {
        self.inner
            .list(scope)
            .into_iter()
            .find(|u| u.username == username)
    }

    /// Verify a username/password pair within the scope's partition.
    ///
    /// Returns the user on success, `None` on unknown username or wrong
    /// password — callers must not distinguish the two.
    pub fn verify_password(
        &self,
        scope: &TenantScope,
        username: &str,
        password: &str,
    ) -> Option<User> {
        let user = self.find_by_username(scope, username)?;
        let parsed = PasswordHash::new(&user.credential_hash).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .ok()?;
        Some(user)
    }

    /// All users in the scope's partition.
    pub fn list(&self, scope: &TenantScope) -> Vec<User> {
        self.inner.list(scope)
    }
}
