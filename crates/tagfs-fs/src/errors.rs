//! Filesystem errors
//!
//! `NotFound` reaches callers only for a missing final leaf (`get`, `stat`).
//! Missing intermediate directories are created by `mkdir_all`, never
//! reported. Store failures pass through unchanged in `Store`.

use tagfs_core::{ObjectId, StoreError};

/// Filesystem result alias
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors from path operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    /// Malformed path or name; a caller bug, not retried
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What is wrong with the input
        message: String,
    },

    /// Nothing exists at the path
    #[error("'{path}' not found")]
    NotFound {
        /// Normalised path
        path: String,
    },

    /// The path is a directory where a file was required
    #[error("'{path}' is not a file")]
    NotAFile {
        /// Normalised path
        path: String,
    },

    /// The path is a file where a directory was required
    #[error("path '{path}' is not a directory")]
    NotADirectory {
        /// Normalised path
        path: String,
    },

    /// Several objects claim the same path and the resolver is set to reject
    #[error("'{path}' matches more than one object")]
    Ambiguous {
        /// Normalised path
        path: String,
    },

    /// A store object lacks the tags needed to project it as an entry
    #[error("Object {id} is not a filesystem entry: {reason}")]
    MalformedEntry {
        /// Offending object
        id: ObjectId,
        /// Missing or invalid tag
        reason: String,
    },

    /// Remote store failure, propagated as-is
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FsError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a not-a-file error
    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create a not-a-directory error
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
