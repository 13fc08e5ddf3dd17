//! Server-side credential verification
//!
//! A verifier needs no session: the header carries the key id and both
//! timestamps, and the signature binds them. Checks run in order: parse,
//! algorithm, freshness window, key lookup, signature.

use crate::credential::verify_signature;
use crate::errors::{AuthError, Result};
use crate::header::AuthHeader;
use crate::identity::Identity;
use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use tagfs_core::{Clock, SystemClock};
use tokio::sync::Mutex;

/// Looks up the public key registered for a key id.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Return the key for `key_id`, or `AuthError::UnknownKey`.
    async fn resolve_key(&self, key_id: u64) -> Result<VerifyingKey>;
}

#[async_trait]
impl<T: KeyResolver + ?Sized> KeyResolver for std::sync::Arc<T> {
    async fn resolve_key(&self, key_id: u64) -> Result<VerifyingKey> {
        (**self).resolve_key(key_id).await
    }
}

/// Fixed in-memory key table.
#[derive(Debug, Clone, Default)]
pub struct StaticKeys {
    keys: HashMap<u64, VerifyingKey>,
}

impl StaticKeys {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key_id: u64, key: VerifyingKey) -> Self {
        self.insert(key_id, key);
        self
    }

    /// Builder-style insert of an identity's public key
    pub fn with_identity(self, identity: &Identity) -> Self {
        self.with(identity.id(), identity.verifying_key())
    }

    /// Register or replace a key
    pub fn insert(&mut self, key_id: u64, key: VerifyingKey) {
        self.keys.insert(key_id, key);
    }
}

#[async_trait]
impl KeyResolver for StaticKeys {
    async fn resolve_key(&self, key_id: u64) -> Result<VerifyingKey> {
        self.keys
            .get(&key_id)
            .copied()
            .ok_or(AuthError::UnknownKey { key_id })
    }
}

/// Memoises keys fetched from a slower resolver (a directory service, say).
///
/// Lookups that fail are not cached.
pub struct CachingKeyResolver<R> {
    inner: R,
    cache: Mutex<HashMap<u64, VerifyingKey>>,
}

impl<R: KeyResolver> CachingKeyResolver<R> {
    /// Wrap `inner` with an empty cache
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Seed the cache, e.g. with the server's own key.
    pub async fn preload(&self, key_id: u64, key: VerifyingKey) {
        self.cache.lock().await.insert(key_id, key);
    }

    /// Number of cached keys
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<R: KeyResolver> KeyResolver for CachingKeyResolver<R> {
    async fn resolve_key(&self, key_id: u64) -> Result<VerifyingKey> {
        let mut cache = self.cache.lock().await;
        if let Some(key) = cache.get(&key_id) {
            return Ok(*key);
        }

        let key = self.inner.resolve_key(key_id).await?;
        tracing::debug!(key_id, "user key retrieved");
        cache.insert(key_id, key);
        Ok(key)
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// Authenticated identity
    pub key_id: u64,
    /// Credential creation time
    pub created: u64,
    /// Credential expiry time
    pub expires: u64,
}

/// Checks `Authorization` header values.
pub struct Verifier<R, C = SystemClock> {
    keys: R,
    clock: C,
}

impl<R: KeyResolver> Verifier<R, SystemClock> {
    /// Verifier using the system clock
    pub fn new(keys: R) -> Self {
        Self {
            keys,
            clock: SystemClock,
        }
    }
}

impl<R: KeyResolver, C: Clock> Verifier<R, C> {
    /// Replace the time source
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Verifier<R, C2> {
        Verifier {
            keys: self.keys,
            clock,
        }
    }

    /// Parse and verify a header value at the current clock reading.
    pub async fn verify(&self, header: &str) -> Result<VerifiedRequest> {
        let header: AuthHeader = header.parse()?;
        self.verify_header(&header).await
    }

    /// Verify an already parsed header at the current clock reading.
    pub async fn verify_header(&self, header: &AuthHeader) -> Result<VerifiedRequest> {
        let now = self.clock.unix_seconds();
        let request = check_freshness(header, now)?;
        let message = header.signing_string()?;
        let signature = header.decode_signature()?;

        let key = self.keys.resolve_key(header.key_id).await?;
        verify_signature(&key, message.as_bytes(), &signature).map_err(|e| {
            tracing::debug!(key_id = header.key_id, error = %e, "failed to validate identity");
            e
        })?;

        Ok(request)
    }
}

/// Structural and time checks that need no key.
///
/// Both timestamps must be present and signed; otherwise an intermediary
/// could stretch the window without invalidating the signature.
fn check_freshness(header: &AuthHeader, now: u64) -> Result<VerifiedRequest> {
    header.check_algorithm()?;

    let (created, expires) = match (header.created, header.expires) {
        (Some(created), Some(expires)) => (created, expires),
        (None, _) => return Err(AuthError::malformed_header("(created) argument is not set")),
        (_, None) => return Err(AuthError::malformed_header("(expires) argument is not set")),
    };
    for required in ["(created)", "(expires)", "(key-id)"] {
        if !header.signs(required) {
            return Err(AuthError::malformed_header(format!(
                "{required} must be covered by the signature"
            )));
        }
    }

    if now < created || now > expires {
        return Err(AuthError::ClockSkew {
            now,
            created,
            expires,
        });
    }

    Ok(VerifiedRequest {
        key_id: header.key_id,
        created,
        expires,
    })
}
