//! # tagfs-core
//!
//! **Purpose**: Define the contract of the remote tagged object store and the
//! types shared by the signing and filesystem layers.
//!
//! # Architecture Constraints
//!
//! - YES Store object types (`ObjectId`, `Tags`, `RemoteObject`, `FoundObject`)
//! - YES The four-operation `RemoteStore` trait
//! - YES Client configuration and the clock abstraction
//! - NO transport implementation (gRPC stubs live with the application)
//! - NO signing logic (that's `tagfs-auth`)
//! - NO path semantics (that's `tagfs-fs`)
//!
//! ## Core Concepts
//!
//! - **Flat objects**: every object has a store-assigned `u32` id, a tag map
//!   and an opaque data payload.
//! - **Tag queries**: `find` matches objects whose tags contain every
//!   key/value pair of the filter, streamed lazily.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Client configuration (TOML + environment overlay)
pub mod config;

/// Store error types
pub mod errors;

/// The remote store contract
pub mod store;

/// Wall-clock abstraction
pub mod time;

/// Object identifiers and tag maps
pub mod types;

pub use config::{
    AuthConfig, ClientConfig, ConfigError, DuplicatePolicy, ResolverConfig, SEED_LENGTH,
};
pub use errors::{Result, StoreError};
pub use store::{FindStream, RemoteStore};
pub use time::{Clock, SystemClock};
pub use types::{FoundObject, ObjectId, RemoteObject, Tags};
