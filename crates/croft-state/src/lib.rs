#![deny(missing_docs)]

//! # croft-state — State Layer for Croft
//!
//! Everything between the HTTP surface and the bytes: the tenant
//! directory, the data-scope binder, and the tenant-partitioned stores.
//!
//! ## The scope contract
//!
//! Every read or write against tenant-owned data requires a
//! [`TenantScope`] — the view handed out by a bound [`ScopeGuard`]. There
//! is no "current tenant" field anywhere in this crate: which partition a
//! query targets is decided by the scope value the caller passes, and that
//! value lives in exactly one request's context. Two requests can race all
//! they like; neither can observe the other's binding because neither can
//! reach the other's scope.
//!
//! ## Locking
//!
//! All stores use `parking_lot::RwLock` over plain maps. Locks are never
//! held across `.await` points (every store operation is synchronous), and
//! `parking_lot` locks do not poison, so a panicking writer cannot wedge
//! the store.

pub mod credential;
pub mod directory;
pub mod scope;
pub mod store;
pub mod users;

pub use credential::{CredentialError, CredentialStore, TokenValidity};
pub use directory::{DirectoryError, TenantDirectory};
pub use scope::{BindError, DataScope, ScopeBinder, ScopeGuard, TenantScope};
pub use store::PartitionedStore;
pub use users::{UserError, UserStore};
