//! Remote store contract.
//!
//! The store is reached over RPC and exposes exactly four logical operations.
//! Every call is independent; the store offers no transactions and no
//! create-if-absent primitive, so callers building higher-level invariants on
//! top of it (such as unique names within a directory) must look up before
//! writing and accept that concurrent writers can race between the two.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: generated RPC client (application), `tagfs-testkit::MemoryStore` (tests)
//! - **Usage**: `tagfs-fs::PathResolver`

use crate::errors::Result;
use crate::types::{FoundObject, ObjectId, RemoteObject, Tags};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy, single-pass stream of `find` results.
///
/// Ends when the store has no more matches. Dropping it early abandons the
/// query without side effects.
pub type FindStream = BoxStream<'static, Result<FoundObject>>;

/// The four operations the client layer relies on.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a new object and return its store-assigned id.
    ///
    /// `data` of `None` creates an object with an empty payload.
    async fn put(&self, tags: Tags, data: Option<Vec<u8>>) -> Result<ObjectId>;

    /// Fetch an object by id. Fails with `StoreError::NotFound` if absent.
    async fn get_by_id(&self, id: ObjectId) -> Result<RemoteObject>;

    /// Partial update: omitted fields are left unchanged.
    async fn update(&self, id: ObjectId, tags: Option<Tags>, data: Option<Vec<u8>>) -> Result<()>;

    /// Stream every object whose tags contain all pairs of `filter`.
    async fn find(&self, filter: Tags) -> Result<FindStream>;
}

/// Blanket implementation for Arc<T> where T: RemoteStore
#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<T> {
    async fn put(&self, tags: Tags, data: Option<Vec<u8>>) -> Result<ObjectId> {
        (**self).put(tags, data).await
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<RemoteObject> {
        (**self).get_by_id(id).await
    }

    async fn update(&self, id: ObjectId, tags: Option<Tags>, data: Option<Vec<u8>>) -> Result<()> {
        (**self).update(id, tags, data).await
    }

    async fn find(&self, filter: Tags) -> Result<FindStream> {
        (**self).find(filter).await
    }
}
