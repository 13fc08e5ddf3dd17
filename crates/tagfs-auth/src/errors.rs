//! Authentication errors

/// Auth result alias
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors raised while building or checking request credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Seed or key bytes do not fit the signature scheme
    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial {
        /// What is wrong with the key
        message: String,
    },

    /// The authorization header could not be parsed
    #[error("Invalid auth header: {message}")]
    MalformedHeader {
        /// Parser message
        message: String,
    },

    /// The header names a scheme this verifier does not implement
    #[error("Unsupported signature algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// Algorithm named in the header
        algorithm: String,
    },

    /// `now` is outside `[created, expires]`
    #[error("Credential not valid at {now}: window is [{created}, {expires}]")]
    ClockSkew {
        /// Verifier time
        now: u64,
        /// Credential creation time
        created: u64,
        /// Credential expiry time
        expires: u64,
    },

    /// The signature does not match the signing string and key
    #[error("Invalid signature: {message}")]
    InvalidSignature {
        /// Verification failure detail
        message: String,
    },

    /// An identity file could not be read or has the wrong shape
    #[error("Invalid identity file {path}: {message}")]
    IdentityFile {
        /// File that was read
        path: String,
        /// What went wrong
        message: String,
    },

    /// No public key is known for the key id
    #[error("Unknown key id: {key_id}")]
    UnknownKey {
        /// Key id from the header
        key_id: u64,
    },
}

impl AuthError {
    /// Create an invalid key material error
    pub fn invalid_key_material(message: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial {
            message: message.into(),
        }
    }

    /// Create a malformed header error
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }
}
