//! # Tenant Directory
//!
//! Resolves a tenant hint (the slug extracted from request metadata) to
//! tenant partition metadata. Resolution is a read-only lookup over a
//! read-mostly map; tenant metadata changes rarely, so the contract is
//! safe to cache with a short TTL, but no cache is layered here —
//! correctness holds either way.
//!
//! Tenants are immutable after creation: there is no update or removal
//! operation. `register` exists for bootstrap provisioning only.

use std::collections::HashMap;
use std::sync::Arc;

use croft_core::{Tenant, TenantSlug};
use parking_lot::RwLock;
use thiserror::Error;

/// Directory lookup/registration failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The hint matched no registered tenant.
    #[error("no tenant matches hint {0:?}")]
    NotFound(String),

    /// A tenant with the same slug is already registered.
    #[error("tenant slug {0:?} is already registered")]
    DuplicateSlug(String),
}

/// Registry of tenants, keyed by slug.
///
/// Clone-friendly: clones share the underlying map.
#[derive(Debug, Clone, Default)]
pub struct TenantDirectory {
    by_slug: Arc<RwLock<HashMap<String, Tenant>>>,
}

impl TenantDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant. Bootstrap-time only.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateSlug`] if the slug is taken.
    pub fn register(&self, tenant: Tenant) -> Result<(), DirectoryError> {
        let mut map = self.by_slug.write();
        let key = tenant.slug.as_str().to_string();
        if map.contains_key(&key) {
            return Err(DirectoryError::DuplicateSlug(key));
        }
        map.insert(key, tenant);
        Ok(())
    }

    /// Resolve a raw hint to a tenant.
    ///
    /// A hint that is not even a well-formed slug resolves to `NotFound`
    /// rather than a distinct error: either way, no such tenant exists.
    pub fn resolve(&self, hint: &str) -> Result<Tenant, DirectoryError> {
        if TenantSlug::new(hint).is_err() {
            return Err(DirectoryError::NotFound(hint.to_string()));
        }
        self.by_slug
            .read()
            .get(hint)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(hint.to_string()))
    }

    /// All registered tenants (bootstrap logging, hydration).
    pub fn list(&self) -> Vec<Tenant> {
        self.by_slug.read().values().cloned().collect()
    }

    /// Number of registered tenants.
    pub fn len(&self) -> usize {
        self.by_slug.read().len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(slug: &str) -> Tenant {
        Tenant::new(TenantSlug::new(slug).unwrap(), slug.to_uppercase())
    }

    #[test]
    fn resolve_registered_tenant() {
        let dir = TenantDirectory::new();
        let acme = tenant("acme");
        dir.register(acme.clone()).unwrap();

        let resolved = dir.resolve("acme").unwrap();
        assert_eq!(resolved.id, acme.id);
        assert_eq!(resolved.partition, acme.partition);
    }

    #[test]
    fn resolve_unknown_hint_is_not_found() {
        let dir = TenantDirectory::new();
        dir.register(tenant("acme")).unwrap();

        assert_eq!(
            dir.resolve("ghost").unwrap_err(),
            DirectoryError::NotFound("ghost".to_string())
        );
    }

    #[test]
    fn resolve_malformed_hint_is_not_found() {
        let dir = TenantDirectory::new();
        assert!(matches!(
            dir.resolve("Not A Slug!").unwrap_err(),
            DirectoryError::NotFound(_)
        ));
    }

    #[test]
    fn duplicate_slug_rejected() {
        let dir = TenantDirectory::new();
        dir.register(tenant("acme")).unwrap();

        let err = dir.register(tenant("acme")).unwrap_err();
        assert_eq!(err, DirectoryError::DuplicateSlug("acme".to_string()));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn clone_shares_registrations() {
        let dir = TenantDirectory::new();
        let clone = dir.clone();
        dir.register(tenant("acme")).unwrap();
        assert!(clone.resolve("acme").is_ok());
    }
}
