//! Path resolver
//!
//! Translates `put` / `get` / `mkdir_all` / `list` on `/`-separated paths
//! into tag lookups and writes against a flat `RemoteStore`. Every entry is an
//! object tagged `{type, name, dir}`; a directory is an object with no payload.
//! The root `/` is implicit and never stored.
//!
//! # Consistency
//!
//! The resolver keeps no state between calls and holds no locks. Name
//! uniqueness within a directory is enforced only by looking up before
//! writing, and the store has no create-if-absent primitive, so two writers
//! creating the same path concurrently can both miss the lookup and both
//! create an object. Last writer wins for data; duplicate siblings are
//! possible under concurrent first creation. `DuplicatePolicy` decides how
//! `resolve` treats them once they exist.
//!
//! Dropping an operation's future mid-way leaves objects already written in
//! place; nothing is rolled back.

use crate::entry::{entry_tags, EntryKind, PathEntry, DIR_TAG, NAME_TAG};
use crate::errors::{FsError, Result};
use crate::path::{self, ROOT};
use futures::stream::{BoxStream, StreamExt};
use tagfs_core::{
    DuplicatePolicy, FindStream, ObjectId, RemoteStore, ResolverConfig, StoreError, Tags,
};
use tracing::{debug, info, warn};

/// Lazy, single-pass sequence of directory entries in store order.
pub type EntryStream = BoxStream<'static, Result<PathEntry>>;

/// Hierarchical namespace over a tag-indexed store.
#[derive(Debug, Clone)]
pub struct PathResolver<S> {
    store: S,
    config: ResolverConfig,
}

impl<S: RemoteStore> PathResolver<S> {
    /// Resolver with default configuration (first match wins)
    pub fn new(store: S) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    /// Resolver with explicit configuration
    pub fn with_config(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Look up the entry called `name` inside `dir`.
    ///
    /// Fails with `InvalidArgument` for an empty or multi-segment name before
    /// any remote call, and with `NotFound` when no object matches.
    pub async fn resolve(&self, dir: &str, name: &str) -> Result<PathEntry> {
        path::validate_name(name)?;
        let dir = path::normalize(dir);
        let target = path::join(&dir, name);
        debug!(path = %target, "resolving");

        let filter = Tags::new().with(DIR_TAG, dir.as_str()).with(NAME_TAG, name);
        let mut results: FindStream = self.store.find(filter).await?;

        let first = match results.next().await {
            None => return Err(FsError::not_found(target)),
            Some(found) => found?,
        };

        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            if let Some(second) = results.next().await {
                let second = second?;
                warn!(
                    path = %target,
                    first = %first.id,
                    second = %second.id,
                    "duplicate objects for one path"
                );
                return Err(FsError::Ambiguous { path: target });
            }
        }

        PathEntry::from_found(first)
    }

    /// Look up the entry at `path`. The root resolves without a remote call.
    pub async fn stat(&self, path: &str) -> Result<PathEntry> {
        if path::is_root(path) {
            return Ok(PathEntry::root());
        }
        let (dir, name) = path::split(path);
        self.resolve(&dir, &name).await
    }

    /// Create every missing directory along `path`.
    ///
    /// Idempotent: existing directories are left untouched and a repeat call
    /// writes nothing. Fails with `NotADirectory` when a segment is a file.
    pub async fn mkdir_all(&self, path: &str) -> Result<()> {
        let mut current = ROOT.to_string();
        for segment in path::segments(path) {
            match self.resolve(&current, &segment).await {
                Ok(entry) if entry.is_dir() => {}
                Ok(_) => return Err(FsError::not_a_directory(path::join(&current, &segment))),
                Err(FsError::NotFound { .. }) => {
                    self.create(EntryKind::Directory, &current, &segment, None)
                        .await?;
                }
                Err(err) => return Err(err),
            }
            current = path::join(&current, &segment);
        }
        Ok(())
    }

    /// Write `data` to the file at `path`, creating parent directories.
    ///
    /// An existing file is updated in place and keeps its object id, which is
    /// returned. Fails with `NotAFile` when `path` is a directory and with
    /// `NotADirectory` when a parent segment is a file.
    pub async fn put(&self, path: &str, data: Vec<u8>) -> Result<ObjectId> {
        if path::is_root(path) {
            return Err(FsError::not_a_file(ROOT));
        }
        let (dir, name) = path::split(path);

        self.mkdir_all(&dir).await?;

        match self.resolve(&dir, &name).await {
            Err(FsError::NotFound { .. }) => {
                self.create(EntryKind::File, &dir, &name, Some(data)).await
            }
            Ok(entry) if entry.is_file() => {
                let id = object_id(&entry)?;
                self.store
                    .update(
                        id,
                        Some(entry_tags(EntryKind::File, &dir, &name)),
                        Some(data),
                    )
                    .await?;
                debug!(path = %entry.path(), %id, "updated file");
                Ok(id)
            }
            Ok(entry) => Err(FsError::not_a_file(entry.path())),
            Err(err) => Err(err),
        }
    }

    /// Read the file at `path`.
    ///
    /// Fails with `NotFound` when nothing exists there and `NotAFile` when it
    /// is a directory.
    pub async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self.stat(path).await?;
        if !entry.is_file() {
            return Err(FsError::not_a_file(entry.path()));
        }

        let id = object_id(&entry)?;
        match self.store.get_by_id(id).await {
            Ok(object) => Ok(object.data),
            Err(StoreError::NotFound { .. }) => Err(FsError::not_found(entry.path())),
            Err(err) => Err(err.into()),
        }
    }

    /// Stream the entries directly inside `dir`, in the order the store emits
    /// them.
    ///
    /// The stream is lazy and single-pass; dropping it early has no effect on
    /// the store. Objects lacking filesystem tags surface as `MalformedEntry`
    /// items rather than ending the stream.
    pub async fn list(&self, dir: &str) -> Result<EntryStream> {
        let dir = path::normalize(dir);
        debug!(dir = %dir, "listing");
        let results = self.store.find(Tags::new().with(DIR_TAG, dir)).await?;
        Ok(results
            .map(|found| found.map_err(FsError::from).and_then(PathEntry::from_found))
            .boxed())
    }

    async fn create(
        &self,
        kind: EntryKind,
        dir: &str,
        name: &str,
        data: Option<Vec<u8>>,
    ) -> Result<ObjectId> {
        let id = self.store.put(entry_tags(kind, dir, name), data).await?;
        info!(path = %path::join(dir, name), %kind, %id, "created entry");
        Ok(id)
    }
}

fn object_id(entry: &PathEntry) -> Result<ObjectId> {
    entry.id.ok_or_else(|| FsError::not_a_file(entry.path()))
}
