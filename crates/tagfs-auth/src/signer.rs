//! Credential production
//!
//! The signer is a pure function of identity and time. It never rejects a
//! credential based on time; that is the verifier's job. Time is read from the
//! clock on every call so a credential is never reused past its window.

use crate::credential::{signing_string, Credential};
use crate::errors::Result;
use crate::identity::Identity;
use std::collections::BTreeMap;
use std::time::Duration;
use tagfs_core::{AuthConfig, Clock, SystemClock};

/// Default distance between `created` and `expires`
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

/// Metadata key the header value is attached under
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Sign a credential for `identity` created at unix second `now`.
///
/// `expires` is `now + window` in whole seconds.
pub fn sign(identity: &Identity, now: u64, window: Duration) -> Credential {
    let created = now;
    let expires = created.saturating_add(window.as_secs());
    let message = signing_string(created, expires, identity.id());

    Credential {
        key_id: identity.id(),
        created,
        expires,
        signature: identity.sign(message.as_bytes()),
    }
}

/// Produces one fresh credential per outbound call.
#[derive(Debug, Clone)]
pub struct Signer<C = SystemClock> {
    identity: Identity,
    window: Duration,
    clock: C,
}

impl Signer<SystemClock> {
    /// Create a signer using the system clock and the default 3 second window.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            window: DEFAULT_WINDOW,
            clock: SystemClock,
        }
    }

    /// Create a signer from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let identity = Identity::from_config(config)?;
        Ok(Self::new(identity).with_window(Duration::from_secs(config.window_secs)))
    }
}

impl<C: Clock> Signer<C> {
    /// Replace the validity window. Sub-second precision is truncated.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Signer<C2> {
        Signer {
            identity: self.identity,
            window: self.window,
            clock,
        }
    }

    /// The identity credentials are issued for
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Distance between `created` and `expires`
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Sign a credential as of `now`.
    pub fn sign_at(&self, now: u64) -> Credential {
        sign(&self.identity, now, self.window)
    }

    /// Sign a credential as of the current clock reading.
    pub fn sign(&self) -> Credential {
        let credential = self.sign_at(self.clock.unix_seconds());
        tracing::trace!(
            key_id = credential.key_id,
            created = credential.created,
            expires = credential.expires,
            "signed request credential"
        );
        credential
    }

    /// Header value for the next call.
    pub fn authorization_header(&self) -> String {
        self.sign().to_header()
    }

    /// Per-call metadata to attach to an outbound request.
    pub fn request_metadata(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([(AUTHORIZATION_KEY, self.authorization_header())])
    }
}
