#![deny(missing_docs)]

//! # croft-core — Foundational Types for Croft
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `chrono`, `uuid`, `subtle`, and `rand` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`UserId`] where a [`TenantId`] is
//!    expected, and a tenant hint is a validated [`TenantSlug`], never a
//!    bare string.
//!
//! 2. **Credentials are opaque and redacted.** [`OpaqueToken`] carries
//!    256 bits of OS entropy, compares in constant time, and never prints
//!    its value through `Debug`.
//!
//! 3. **Structured errors with `thiserror`.** The authentication taxonomy
//!    ([`AuthError`]) is a closed enum — callers match variants, they do not
//!    parse strings.

pub mod error;
pub mod identity;
pub mod record;
pub mod role;
pub mod token;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{AuthError, ValidationError};
pub use identity::{PartitionKey, TenantId, TenantSlug, UserId, WidgetId};
pub use record::{Principal, Tenant, Token, User, Widget};
pub use role::{Role, RoleSet};
pub use token::OpaqueToken;
