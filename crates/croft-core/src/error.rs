//! # Error Types — Structured Error Taxonomy
//!
//! Defines the error types shared across the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`AuthError`] is the closed authentication taxonomy. The HTTP layer
//!   collapses every variant into one opaque 401 body; the variant itself
//!   goes to the logs, never to the caller.
//! - [`ValidationError`] covers construction-time validation of domain
//!   primitives and carries the rejected value.

use thiserror::Error;

/// Validation failure when constructing a domain primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Tenant slug did not match the required label format.
    #[error("invalid tenant slug: {0:?} (expected 1-63 lowercase alphanumeric/hyphen chars, starting with a letter)")]
    InvalidSlug(String),

    /// Role name not recognized.
    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    /// Username empty or over length limit.
    #[error("invalid username: {0:?} (expected 1-64 non-blank chars)")]
    InvalidUsername(String),

    /// Widget name empty or over length limit.
    #[error("invalid widget name: {0:?} (expected 1-255 non-blank chars)")]
    InvalidWidgetName(String),
}

/// Authentication failure taxonomy.
///
/// All variants are terminal for the current request. Variant identity is
/// for logs and tests; user-visible responses never distinguish them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was presented, or the presented token was empty.
    #[error("missing credential")]
    MissingCredential,

    /// The token resolved to no user within the bound tenant.
    #[error("invalid credential")]
    InvalidCredential,

    /// The token exists but its validity window has elapsed.
    #[error("expired credential")]
    ExpiredCredential,
}

impl AuthError {
    /// Stable machine-readable name, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::ExpiredCredential => "expired_credential",
        }
    }
}
