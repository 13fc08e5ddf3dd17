//! Store errors
//!
//! Errors raised by a `RemoteStore` implementation. The filesystem layer
//! reinterprets `NotFound` where it is a control-flow signal and passes
//! everything else through unchanged.

use crate::types::ObjectId;

/// Store result alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for remote store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No object exists with the given id
    #[error("Object not found: {id}")]
    NotFound {
        /// The id that was requested
        id: ObjectId,
    },

    /// The call failed in transit (connection, timeout, cancellation)
    #[error("Transport error: {message}")]
    Transport {
        /// Transport-level description
        message: String,
    },

    /// The store refused the call (authentication, permission, validation)
    #[error("Request rejected: {message}")]
    Rejected {
        /// Reason reported by the store
        message: String,
    },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: ObjectId) -> Self {
        Self::NotFound { id }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
