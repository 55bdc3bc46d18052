//! # Data-Scope Binder
//!
//! Binds data access to one tenant's partition for the duration of one
//! request, and guarantees the binding is cleared on every exit path.
//!
//! ## Shape
//!
//! - [`DataScope`] is the per-request slot. The gateway opens one per
//!   incoming request; it starts unbound. Because the slot is owned by
//!   that request's future, the binding is execution-flow-local by
//!   construction — there is nothing shared to leak through.
//! - [`ScopeBinder`] performs bind/unbind on a slot and keeps a registry
//!   of active bindings. The registry exists for diagnostics and tests
//!   (`active_bindings` must read zero once a request completes); query
//!   routing never consults it.
//! - [`TenantScope`] is the cheap view of a binding (tenant id +
//!   partition key) that every store operation takes as a parameter.
//! - [`ScopeGuard`] is the RAII wrapper the gateway holds across handler
//!   dispatch: dropping it unbinds, which covers normal return, handler
//!   errors, authentication rejection, and panic unwind alike.
//!
//! Binding does not open a database transaction; it only selects which
//! partition subsequent data operations target.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use croft_core::{PartitionKey, Tenant, TenantId};
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// Binding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The scope slot already holds a binding. A slot binds exactly once
    /// per request lifetime.
    #[error("scope is already bound to tenant {0}")]
    AlreadyBound(TenantId),

    /// The binder has been shut down and accepts no new bindings.
    #[error("scope binder is closed")]
    Closed,
}

/// The view of a bound scope that data operations take as a parameter.
///
/// Cloning is cheap and does not extend the binding's lifetime; the
/// binding ends when the owning [`ScopeGuard`] drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: TenantId,
    partition: PartitionKey,
}

impl TenantScope {
    /// Build a scope view for a tenant.
    ///
    /// Outside of tests, scopes reach store code through a bound
    /// [`ScopeGuard`], not through this constructor.
    pub fn for_tenant(tenant: &Tenant) -> Self {
        Self {
            tenant_id: tenant.id,
            partition: tenant.partition.clone(),
        }
    }

    /// Tenant this scope routes to.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Partition descriptor data operations target.
    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }
}

/// Per-request scope slot. Starts unbound; binds at most once.
#[derive(Debug)]
pub struct DataScope {
    id: Uuid,
    binding: Option<TenantScope>,
}

impl DataScope {
    /// The slot's identity in the binder's registry.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current binding, if any.
    pub fn binding(&self) -> Option<&TenantScope> {
        self.binding.as_ref()
    }
}

/// Binds and releases per-request data scopes.
///
/// Clone-friendly: clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct ScopeBinder {
    active: Arc<RwLock<HashMap<Uuid, TenantId>>>,
    closed: Arc<AtomicBool>,
}

impl ScopeBinder {
    /// Create a binder with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh, unbound scope slot for one request.
    pub fn open(&self) -> DataScope {
        DataScope {
            id: Uuid::new_v4(),
            binding: None,
        }
    }

    /// Bind a scope slot to a tenant's partition.
    ///
    /// # Errors
    ///
    /// - [`BindError::AlreadyBound`] if the slot already holds a binding.
    /// - [`BindError::Closed`] if the binder has been shut down.
    pub fn bind(&self, scope: &mut DataScope, tenant: &Tenant) -> Result<(), BindError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BindError::Closed);
        }
        if let Some(existing) = &scope.binding {
            return Err(BindError::AlreadyBound(existing.tenant_id));
        }

        scope.binding = Some(TenantScope::for_tenant(tenant));
        self.active.write().insert(scope.id, tenant.id);
        Ok(())
    }

    /// Clear a slot's binding. Idempotent: unbinding an unbound slot is a
    /// no-op.
    pub fn unbind(&self, scope: &mut DataScope) {
        if scope.binding.take().is_some() {
            self.active.write().remove(&scope.id);
        }
    }

    /// Whether the given slot currently holds a binding.
    pub fn is_bound(&self, scope: &DataScope) -> bool {
        scope.binding.is_some()
    }

    /// Number of scopes currently bound across all in-flight requests.
    pub fn active_bindings(&self) -> usize {
        self.active.read().len()
    }

    /// Stop accepting new bindings (shutdown). Existing bindings release
    /// normally.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// RAII wrapper holding a bound scope for one request.
///
/// The gateway creates one after tenant resolution and keeps it alive
/// across handler dispatch; dropping it releases the binding
/// unconditionally.
#[derive(Debug)]
pub struct ScopeGuard {
    binder: ScopeBinder,
    scope: DataScope,
}

impl ScopeGuard {
    /// Open a slot and bind it to `tenant` in one step.
    pub fn bind(binder: &ScopeBinder, tenant: &Tenant) -> Result<Self, BindError> {
        let mut scope = binder.open();
        binder.bind(&mut scope, tenant)?;
        Ok(Self {
            binder: binder.clone(),
            scope,
        })
    }

    /// The bound scope view to hand to data operations.
    pub fn view(&self) -> TenantScope {
        self.scope
            .binding()
            .cloned()
            .expect("a ScopeGuard always holds a bound scope")
    }

    /// The underlying slot id (diagnostics).
    pub fn scope_id(&self) -> Uuid {
        self.scope.id()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.binder.unbind(&mut self.scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use croft_core::TenantSlug;

    fn tenant(slug: &str) -> Tenant {
        Tenant::new(TenantSlug::new(slug).unwrap(), slug.to_uppercase())
    }

    #[test]
    fn bind_records_active_binding() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");

        let mut scope = binder.open();
        assert!(!binder.is_bound(&scope));

        binder.bind(&mut scope, &acme).unwrap();
        assert!(binder.is_bound(&scope));
        assert_eq!(binder.active_bindings(), 1);
        assert_eq!(scope.binding().unwrap().tenant_id(), acme.id);
    }

    #[test]
    fn rebind_is_rejected() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");
        let globex = tenant("globex");

        let mut scope = binder.open();
        binder.bind(&mut scope, &acme).unwrap();

        let err = binder.bind(&mut scope, &globex).unwrap_err();
        assert_eq!(err, BindError::AlreadyBound(acme.id));

        // The original binding is untouched.
        assert_eq!(scope.binding().unwrap().tenant_id(), acme.id);
        assert_eq!(binder.active_bindings(), 1);
    }

    #[test]
    fn unbind_clears_binding() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");

        let mut scope = binder.open();
        binder.bind(&mut scope, &acme).unwrap();
        binder.unbind(&mut scope);

        assert!(!binder.is_bound(&scope));
        assert_eq!(binder.active_bindings(), 0);
    }

    #[test]
    fn unbind_is_idempotent() {
        let binder = ScopeBinder::new();
        let mut scope = binder.open();
        binder.unbind(&mut scope);
        binder.unbind(&mut scope);
        assert_eq!(binder.active_bindings(), 0);
    }

    #[test]
    fn scope_can_rebind_after_unbind() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");
        let globex = tenant("globex");

        let mut scope = binder.open();
        binder.bind(&mut scope, &acme).unwrap();
        binder.unbind(&mut scope);
        binder.bind(&mut scope, &globex).unwrap();

        assert_eq!(scope.binding().unwrap().tenant_id(), globex.id);
    }

    #[test]
    fn closed_binder_rejects_bind() {
        let binder = ScopeBinder::new();
        binder.close();

        let mut scope = binder.open();
        assert_eq!(
            binder.bind(&mut scope, &tenant("acme")).unwrap_err(),
            BindError::Closed
        );
    }

    #[test]
    fn guard_releases_on_drop() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");

        {
            let guard = ScopeGuard::bind(&binder, &acme).unwrap();
            assert_eq!(guard.view().tenant_id(), acme.id);
            assert_eq!(binder.active_bindings(), 1);
        }

        assert_eq!(binder.active_bindings(), 0);
    }

    #[test]
    fn guard_releases_on_panic_unwind() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopeGuard::bind(&binder, &acme).unwrap();
            panic!("handler blew up");
        }));

        assert!(result.is_err());
        assert_eq!(binder.active_bindings(), 0);
    }

    #[test]
    fn concurrent_guards_are_independent() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");
        let globex = tenant("globex");

        let guard_a = ScopeGuard::bind(&binder, &acme).unwrap();
        let guard_b = ScopeGuard::bind(&binder, &globex).unwrap();

        assert_eq!(binder.active_bindings(), 2);
        assert_eq!(guard_a.view().tenant_id(), acme.id);
        assert_eq!(guard_b.view().tenant_id(), globex.id);

        drop(guard_a);
        assert_eq!(binder.active_bindings(), 1);
        // B's binding is unaffected by A's release.
        assert_eq!(guard_b.view().tenant_id(), globex.id);

        drop(guard_b);
        assert_eq!(binder.active_bindings(), 0);
    }

    #[test]
    fn view_carries_partition_key() {
        let binder = ScopeBinder::new();
        let acme = tenant("acme");
        let guard = ScopeGuard::bind(&binder, &acme).unwrap();
        assert_eq!(guard.view().partition().as_str(), "tenant_acme");
    }
}
