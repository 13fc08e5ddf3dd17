//! Signing identity
//!
//! An identity is the numeric id the store knows a user by, together with the
//! Ed25519 key that proves it. It is passed explicitly to whoever signs; there
//! is no process-wide default.
//!
//! The key comes from a 32-byte seed, given raw, hex-encoded, or as the
//! entropy of a 24-word BIP-39 phrase.

use crate::errors::{AuthError, Result};
use bip39::{Language, Mnemonic};
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tagfs_core::AuthConfig;

/// Length in bytes of an Ed25519 seed
pub const SEED_LENGTH: usize = tagfs_core::SEED_LENGTH;
const _: () = assert!(SEED_LENGTH == SECRET_KEY_LENGTH);

/// Identity file version understood by `Identity::from_identity_file`
pub const IDENTITY_FILE_VERSION: &str = "1.1.0";

#[derive(Deserialize)]
struct IdentityFile {
    threebotid: u64,
    mnemonic: String,
}

/// Numeric id plus Ed25519 signing key. Immutable once constructed.
#[derive(Clone)]
pub struct Identity {
    id: u64,
    signing_key: SigningKey,
}

impl Identity {
    /// Build an identity from a raw 32-byte seed.
    pub fn from_seed(id: u64, seed: &[u8]) -> Result<Self> {
        let seed: &[u8; SEED_LENGTH] = seed.try_into().map_err(|_| {
            AuthError::invalid_key_material(format!(
                "seed has the wrong size {}, expected {SEED_LENGTH}",
                seed.len()
            ))
        })?;

        Ok(Self {
            id,
            signing_key: SigningKey::from_bytes(seed),
        })
    }

    /// Build an identity from a hex-encoded seed.
    pub fn from_hex_seed(id: u64, seed: &str) -> Result<Self> {
        let bytes = hex::decode(seed.trim())
            .map_err(|e| AuthError::invalid_key_material(format!("seed is not hex: {e}")))?;
        Self::from_seed(id, &bytes)
    }

    /// Build an identity from a BIP-39 English phrase.
    ///
    /// The phrase's entropy is used as the seed, so only 24-word phrases
    /// carry enough entropy for a key.
    pub fn from_mnemonic(id: u64, phrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.trim())
            .map_err(|e| AuthError::invalid_key_material(format!("invalid mnemonic: {e}")))?;
        let (entropy, len) = mnemonic.to_entropy_array();
        Self::from_seed(id, &entropy[..len])
    }

    /// Load an identity file.
    ///
    /// The file holds two concatenated JSON values: the format version string,
    /// then `{"threebotid": <id>, "mnemonic": "<phrase>"}`.
    pub fn from_identity_file(path: &Path) -> Result<Self> {
        let file_error = |message: String| AuthError::IdentityFile {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let mut values =
            serde_json::Deserializer::from_str(&content).into_iter::<serde_json::Value>();

        let version: String = match values.next() {
            Some(Ok(value)) => serde_json::from_value(value)
                .map_err(|e| file_error(format!("failed to parse version: {e}")))?,
            Some(Err(e)) => return Err(file_error(format!("failed to parse version: {e}"))),
            None => return Err(file_error("file is empty".to_string())),
        };
        if version != IDENTITY_FILE_VERSION {
            return Err(file_error(format!("unsupported version '{version}'")));
        }

        let info: IdentityFile = match values.next() {
            Some(Ok(value)) => serde_json::from_value(value)
                .map_err(|e| file_error(format!("failed to parse identity: {e}")))?,
            Some(Err(e)) => return Err(file_error(format!("failed to parse identity: {e}"))),
            None => return Err(file_error("no identity object".to_string())),
        };

        tracing::debug!(path = %path.display(), key_id = info.threebotid, "loaded identity file");
        Self::from_mnemonic(info.threebotid, &info.mnemonic)
    }

    /// Build an identity from the `[auth]` configuration section.
    ///
    /// Exactly one of `seed` and `mnemonic` must be set.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        match (config.seed.as_deref(), config.mnemonic.as_deref()) {
            (Some(seed), None) => Self::from_hex_seed(config.key_id, seed),
            (None, Some(phrase)) => Self::from_mnemonic(config.key_id, phrase),
            (Some(_), Some(_)) => Err(AuthError::invalid_key_material(
                "both seed and mnemonic configured",
            )),
            (None, None) => Err(AuthError::invalid_key_material(
                "no signing seed configured",
            )),
        }
    }

    /// Generate a fresh random identity.
    ///
    /// Uses the OS RNG; intended for tools and tests that mint throwaway keys.
    pub fn generate(id: u64) -> Self {
        Self {
            id,
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Numeric key id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Public half of the signing key
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign arbitrary bytes. Ed25519 is deterministic: equal input, equal output.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("public_key", &hex::encode(self.verifying_key().as_bytes()))
            .finish_non_exhaustive()
    }
}
