//! tagfs-auth: per-call request signatures
//!
//! Every outbound call to the store carries an `Authorization` value of the
//! form
//!
//! ```text
//! Signature keyId="6",algorithm="ed25519",created="1700000000",expires="1700000003",headers="(created) (expires) (key-id)",signature="<base64>"
//! ```
//!
//! The signature covers a canonical string built from `created`, `expires`
//! and the key id, so a stateless verifier can reject stale or future-dated
//! requests without a shared session.
//!
//! ## Core Components
//!
//! - **Identity**: numeric key id plus Ed25519 signing key
//! - **Signer**: produces a fresh `Credential` per call
//! - **AuthHeader**: parser for the header value
//! - **Verifier**: server-side checks (freshness window, signature, key lookup)

#![forbid(unsafe_code)]

/// Credentials and the canonical signing string
pub mod credential;

/// Authentication error types
pub mod errors;

/// Header value parsing
pub mod header;

/// Signing identities
pub mod identity;

/// Credential production
pub mod signer;

/// Credential verification and key lookup
pub mod verifier;

pub use credential::{signing_string, verify_signature, Credential, ALGORITHM, SIGNED_HEADERS};
pub use errors::{AuthError, Result};
pub use header::AuthHeader;
pub use identity::{Identity, IDENTITY_FILE_VERSION, SEED_LENGTH};
pub use signer::{sign, Signer, AUTHORIZATION_KEY, DEFAULT_WINDOW};
pub use verifier::{CachingKeyResolver, KeyResolver, StaticKeys, VerifiedRequest, Verifier};

pub use ed25519_dalek::{Signature, VerifyingKey};
