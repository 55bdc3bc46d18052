//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout Croft. Each
//! identifier is a distinct type — you cannot pass a [`UserId`] where a
//! [`TenantId`] is expected.
//!
//! ## Validation
//!
//! The string-based [`TenantSlug`] validates format at construction time.
//! UUID-based identifiers ([`TenantId`], [`UserId`], [`WidgetId`]) are
//! always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// A unique identifier for a tenant — an isolated customer partition of
/// data within a shared deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Create a new random tenant identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a tenant identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a user. Users are owned by exactly one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a widget record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Create a new random widget identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a widget identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// Tenant slug — the public, routable name of a tenant.
///
/// This is the hint the gateway extracts from the `X-Tenant-Id` header or
/// the leftmost `Host` label, so the format is a DNS-label subset:
///
/// - 1 to 63 characters
/// - lowercase ASCII letters, digits, and hyphens
/// - must start with a letter, must not end with a hyphen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantSlug(String);

impl TenantSlug {
    /// Create a slug from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSlug`] if the string does not
    /// match the label format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let bad = || ValidationError::InvalidSlug(s.to_string());

        if s.is_empty() || s.len() > 63 {
            return Err(bad());
        }
        if !s.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(bad());
        }
        if s.ends_with('-') {
            return Err(bad());
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(bad());
        }
        Ok(())
    }

    /// Access the slug string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition key — the physical partition descriptor a bound scope routes
/// data operations to (a schema-name-style string, e.g. `tenant_acme`).
///
/// Derived deterministically from the tenant slug at creation; hyphens are
/// mapped to underscores so the key is a valid SQL identifier fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Derive the partition key for a tenant slug.
    pub fn for_slug(slug: &TenantSlug) -> Self {
        Self(format!("tenant_{}", slug.as_str().replace('-', "_")))
    }

    /// Access the partition key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
