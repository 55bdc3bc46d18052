//! # Tenant-Partitioned Store
//!
//! Generic in-memory store where every record lives in exactly one
//! tenant's partition and every operation names its partition through a
//! [`TenantScope`]. There is no unscoped read or write: the partition
//! dimension is part of every method signature, so "forgot to filter by
//! tenant" is unrepresentable.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use croft_core::TenantId;
use parking_lot::RwLock;

use crate::scope::TenantScope;

/// Thread-safe, cloneable, tenant-partitioned key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
#[derive(Debug)]
pub struct PartitionedStore<K, T> {
    partitions: Arc<RwLock<HashMap<TenantId, HashMap<K, T>>>>,
}

impl<K, T> Clone for PartitionedStore<K, T> {
    fn clone(&self) -> Self {
        Self {
            partitions: Arc::clone(&self.partitions),
        }
    }
}

impl<K, T> PartitionedStore<K, T>
where
    K: Eq + Hash + Copy,
    T: Clone,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record into the scope's partition, returning the previous
    /// value if the key existed there.
    pub fn insert(&self, scope: &TenantScope, key: K, value: T) -> Option<T> {
        self.partitions
            .write()
            .entry(scope.tenant_id())
            .or_default()
            .insert(key, value)
    }

    /// Retrieve a record from the scope's partition.
    pub fn get(&self, scope: &TenantScope, key: &K) -> Option<T> {
        self.partitions
            .read()
            .get(&scope.tenant_id())
            .and_then(|p| p.get(key))
            .cloned()
    }

    /// List all records in the scope's partition.
    pub fn list(&self, scope: &TenantScope) -> Vec<T> {
        self.partitions
            .read()
            .get(&scope.tenant_id())
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Update a record in place within the scope's partition. Returns the
    /// updated record, or `None` if the key is absent there.
    pub fn update(&self, scope: &TenantScope, key: &K, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.partitions.write();
        let partition = guard.get_mut(&scope.tenant_id())?;
        let entry = partition.get_mut(key)?;
        f(entry);
        Some(entry.clone())
    }

    /// Remove a record from the scope's partition.
    pub fn remove(&self, scope: &TenantScope, key: &K) -> Option<T> {
        self.partitions
            .write()
            .get_mut(&scope.tenant_id())
            .and_then(|p| p.remove(key))
    }

    /// Whether the scope's partition contains the key.
    pub fn contains(&self, scope: &TenantScope, key: &K) -> bool {
        self.partitions
            .read()
            .get(&scope.tenant_id())
            .is_some_and(|p| p.contains_key(key))
    }

    /// Number of records in the scope's partition.
    pub fn len(&self, scope: &TenantScope) -> usize {
        self.partitions
            .read()
            .get(&scope.tenant_id())
            .map_or(0, |p| p.len())
    }

    /// Whether the scope's partition is empty.
    pub fn is_empty(&self, scope: &TenantScope) -> bool {
        self.len(scope) == 0
    }
}

impl<K, T> Default for PartitionedStore<K, T>
where
    K: Eq + Hash + Copy,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use croft_core::{Tenant, TenantSlug};
    use uuid::Uuid;

    fn scope(slug: &str) -> TenantScope {
        let tenant = Tenant::new(TenantSlug::new(slug).unwrap(), slug.to_uppercase());
        TenantScope::for_tenant(&tenant)
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let store: PartitionedStore<Uuid, String> = PartitionedStore::new();
        let acme = scope("acme");
        let key = Uuid::new_v4();

        assert!(store.insert(&acme, key, "hello".to_string()).is_none());
        assert_eq!(store.get(&acme, &key).as_deref(), Some("hello"));
    }

    #[test]
    fn partitions_are_isolated() {
        let store: PartitionedStore<Uuid, String> = PartitionedStore::new();
        let acme = scope("acme");
        let globex = scope("globex");
        let key = Uuid::new_v4();

        store.insert(&acme, key, "acme-owned".to_string());

        // Same key, different scope: invisible.
        assert!(store.get(&globex, &key).is_none());
        assert!(!store.contains(&globex, &key));
        assert!(store.list(&globex).is_empty());
        assert_eq!(store.len(&globex), 0);
    }

    #[test]
    fn update_modifies_only_own_partition() {
        let store: PartitionedStore<Uuid, String> = PartitionedStore::new();
        let acme = scope("acme");
        let globex = scope("globex");
        let key = Uuid::new_v4();

        store.insert(&acme, key, "a".to_string());
        store.insert(&globex, key, "g".to_string());

        store.update(&acme, &key, |v| v.push_str("-updated"));

        assert_eq!(store.get(&acme, &key).as_deref(), Some("a-updated"));
        assert_eq!(store.get(&globex, &key).as_deref(), Some("g"));
    }

    #[test]
    fn update_returns_none_for_missing_key() {
        let store: PartitionedStore<Uuid, String> = PartitionedStore::new();
        let acme = scope("acme");
        assert!(store
            .update(&acme, &Uuid::new_v4(), |v| v.clear())
            .is_none());
    }

    #[test]
    fn remove_deletes_from_own_partition_only() {
        let store: PartitionedStore<Uuid, String> = PartitionedStore::new();
        let acme = scope("acme");
        let globex = scope("globex");
        let key = Uuid::new_v4();

        store.insert(&acme, key, "a".to_string());
        store.insert(&globex, key, "g".to_string());

        assert_eq!(store.remove(&acme, &key).as_deref(), Some("a"));
        assert!(store.get(&acme, &key).is_none());
        assert_eq!(store.get(&globex, &key).as_deref(), Some("g"));
    }

    #[test]
    fn list_returns_all_in_partition() {
        let store: PartitionedStore<Uuid, i32> = PartitionedStore::new();
        let acme = scope("acme");

        store.insert(&acme, Uuid::new_v4(), 1);
        store.insert(&acme, Uuid::new_v4(), 2);
        store.insert(&acme, Uuid::new_v4(), 3);

        let mut values = store.list(&acme);
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn clone_shares_underlying_data() {
        let store: PartitionedStore<Uuid, i32> = PartitionedStore::new();
        let clone = store.clone();
        let acme = scope("acme");
        let key = Uuid::new_v4();

        store.insert(&acme, key, 7);
        assert_eq!(clone.get(&acme, &key), Some(7));
    }
}
