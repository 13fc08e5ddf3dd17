//! Signed credentials and their canonical signing string.

use crate::errors::{AuthError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature, VerifyingKey};
use std::fmt;

/// Algorithm identifier placed in the header
pub const ALGORITHM: &str = "ed25519";

/// Pseudo-headers covered by the signature, in signing order
pub const SIGNED_HEADERS: &str = "(created) (expires) (key-id)";

/// Build the canonical string a credential signs.
///
/// Three newline-joined fields in fixed order, no trailing newline:
///
/// ```text
/// (created): 1700000000
/// (expires): 1700000003
/// (key-id): 6
/// ```
pub fn signing_string(created: u64, expires: u64, key_id: u64) -> String {
    format!("(created): {created}\n(expires): {expires}\n(key-id): {key_id}")
}

/// Verify an Ed25519 signature over `message`.
///
/// Uses strict verification, which rejects malleable and small-order
/// signatures.
pub fn verify_signature(key: &VerifyingKey, message: &[u8], signature: &Signature) -> Result<()> {
    key.verify_strict(message, signature)
        .map_err(|e| AuthError::invalid_signature(e.to_string()))
}

/// A time-bound proof of identity for one call. Derived per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Identity the credential speaks for
    pub key_id: u64,
    /// Unix seconds at signing
    pub created: u64,
    /// Unix seconds after which the credential is rejected
    pub expires: u64,
    /// Signature over `signing_string(created, expires, key_id)`
    pub signature: Signature,
}

impl Credential {
    /// The canonical string this credential's signature covers.
    pub fn signing_string(&self) -> String {
        signing_string(self.created, self.expires, self.key_id)
    }

    /// Signature bytes, padded standard base64.
    pub fn signature_base64(&self) -> String {
        STANDARD.encode(self.signature.to_bytes())
    }

    /// Render the `Authorization` header value.
    pub fn to_header(&self) -> String {
        self.to_string()
    }

    /// True when `now` lies within `[created, expires]`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.created <= now && now <= self.expires
    }

    /// Check freshness at `now` and the signature under `key`.
    pub fn verify(&self, key: &VerifyingKey, now: u64) -> Result<()> {
        if !self.is_valid_at(now) {
            return Err(AuthError::ClockSkew {
                now,
                created: self.created,
                expires: self.expires,
            });
        }
        verify_signature(key, self.signing_string().as_bytes(), &self.signature)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"Signature keyId="{}",algorithm="{ALGORITHM}",created="{}",expires="{}",headers="{SIGNED_HEADERS}",signature="{}""#,
            self.key_id,
            self.created,
            self.expires,
            self.signature_base64()
        )
    }
}
