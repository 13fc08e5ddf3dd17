//! # tagfs-fs
//!
//! **Purpose**: Path-addressable files and directories on top of a store that
//! only offers numeric ids, tag maps and tag-equality queries.
//!
//! ## Core Concepts
//!
//! - **Entries**: each file or directory is one store object tagged
//!   `type` (`file`/`dir`), `name` and `dir` (absolute parent path)
//! - **Resolution**: `find {dir, name}`, first result wins by default
//! - **Type safety**: a path is never silently turned from a file into a
//!   directory or back; writers fail with `NotAFile` / `NotADirectory`
//!
//! ## What's NOT in this crate
//!
//! - Transport or signing (`tagfs-auth` produces the credentials)
//! - Caching: every call reflects live store state

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Entry projection and reserved tag names
pub mod entry;

/// Filesystem error types
pub mod errors;

/// Path normalisation helpers
pub mod path;

/// The path resolver
pub mod resolver;

pub use entry::{EntryKind, PathEntry};
pub use errors::{FsError, Result};
pub use resolver::{EntryStream, PathResolver};
