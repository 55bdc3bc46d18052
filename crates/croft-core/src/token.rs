//! # Opaque Bearer Tokens
//!
//! The credential format: an opaque random string with no embedded
//! structure, validated only by store lookup within the bound tenant.
//!
//! ## Properties
//!
//! - 32 bytes of OS entropy, hex-encoded (256 bits — well above the
//!   128-bit floor the credential format requires).
//! - Constant-time comparison against presented strings, so a store scan
//!   cannot leak prefix information through timing.
//! - `Debug` never prints the value.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Number of random bytes in a generated token.
const TOKEN_BYTES: usize = 32;

/// An opaque bearer token value.
///
/// Serializes as a plain string (it must travel in login responses and
/// persistence rows); `Debug` is redacted to keep credentials out of logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    /// Generate a fresh token from OS entropy.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex_encode(&bytes))
    }

    /// Wrap an existing token string (e.g. loaded from persistence).
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the token string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a presented credential string.
    ///
    /// When lengths differ a dummy comparison runs so the length mismatch
    /// itself does not shortcut the timing profile.
    pub fn matches(&self, presented: &str) -> bool {
        let stored = self.0.as_bytes();
        let presented = presented.as_bytes();
        if stored.len() != presented.len() {
            let _ = stored.ct_eq(stored);
            return false;
        }
        stored.ct_eq(presented).into()
    }
}

impl PartialEq for OpaqueToken {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl Eq for OpaqueToken {}

impl std::fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OpaqueToken").field(&"[REDACTED]").finish()
    }
}

/// Encode bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02x}").expect("writing to a String cannot fail");
    }
    out
}
