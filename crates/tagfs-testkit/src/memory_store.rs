//! In-memory `RemoteStore` for tests.
//!
//! Behaves like the remote store as far as the client layer can observe:
//! ids are assigned from 1 upwards, `find` streams matches in id order, and
//! the store maintains the `:created` and `:size` metadata tags itself.
//! On top of that it counts calls per operation and can fail the next call of
//! a chosen operation, so tests can assert on remote traffic and error
//! propagation.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tagfs_core::{
    Clock, FindStream, FoundObject, ObjectId, RemoteObject, RemoteStore, StoreError, SystemClock,
    Tags,
};
use tokio::sync::Mutex;

/// Tag the store sets to the creation time in unix seconds
pub const CREATED_TAG: &str = ":created";

/// Tag the store sets to the payload length in bytes
pub const SIZE_TAG: &str = ":size";

/// The four store operations, for counting and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `put`
    Put,
    /// `get_by_id`
    GetById,
    /// `update`
    Update,
    /// `find`
    Find,
}

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `put` calls
    pub put: usize,
    /// `get_by_id` calls
    pub get_by_id: usize,
    /// `update` calls
    pub update: usize,
    /// `find` calls
    pub find: usize,
}

impl CallCounts {
    /// Calls across all operations
    pub fn total(&self) -> usize {
        self.put + self.get_by_id + self.update + self.find
    }

    fn bump(&mut self, op: StoreOp) {
        match op {
            StoreOp::Put => self.put += 1,
            StoreOp::GetById => self.get_by_id += 1,
            StoreOp::Update => self.update += 1,
            StoreOp::Find => self.find += 1,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    tags: Tags,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    objects: BTreeMap<ObjectId, StoredObject>,
    calls: CallCounts,
    faults: HashMap<StoreOp, StoreError>,
}

impl State {
    /// Count the call and return an injected fault, if armed.
    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.bump(op);
        match self.faults.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn insert(&mut self, tags: Tags, data: Vec<u8>, now: u64) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId::new(self.next_id);
        let tags = stamp(user_tags(tags), now, data.len());
        self.objects.insert(id, StoredObject { tags, data });
        id
    }
}

/// Drop any store-maintained `:` tags a caller tried to set.
fn user_tags(tags: Tags) -> Tags {
    tags.iter()
        .filter(|(key, _)| !key.starts_with(':'))
        .collect()
}

fn stamp(mut tags: Tags, created: u64, size: usize) -> Tags {
    tags.insert(CREATED_TAG, created.to_string());
    tags.insert(SIZE_TAG, size.to_string());
    tags
}

/// Shared in-memory store. Clones see the same objects.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Empty store stamping `:created` from the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Empty store stamping `:created` from `clock`
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock: Arc::new(clock),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the call counters
    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    /// Snapshot of every object, in id order
    pub async fn objects(&self) -> Vec<RemoteObject> {
        self.state
            .lock()
            .await
            .objects
            .iter()
            .map(|(id, object)| RemoteObject {
                id: *id,
                tags: object.tags.clone(),
                data: object.data.clone(),
            })
            .collect()
    }

    /// Fail the next call of `op` with `err`. One-shot.
    pub async fn fail_next(&self, op: StoreOp, err: StoreError) {
        tracing::debug!(?op, error = %err, "armed store fault");
        self.state.lock().await.faults.insert(op, err);
    }

    /// Create an object without counting a call, as another client would.
    pub async fn insert_raw(&self, tags: Tags, data: Vec<u8>) -> ObjectId {
        let now = self.clock.unix_seconds();
        self.state.lock().await.insert(tags, data, now)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn put(&self, tags: Tags, data: Option<Vec<u8>>) -> Result<ObjectId, StoreError> {
        let now = self.clock.unix_seconds();
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Put)?;
        Ok(state.insert(tags, data.unwrap_or_default(), now))
    }

    async fn get_by_id(&self, id: ObjectId) -> Result<RemoteObject, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::GetById)?;
        state
            .objects
            .get(&id)
            .map(|object| RemoteObject {
                id,
                tags: object.tags.clone(),
                data: object.data.clone(),
            })
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn update(
        &self,
        id: ObjectId,
        tags: Option<Tags>,
        data: Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Update)?;
        let object = state
            .objects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;

        let created = object.tags.get(CREATED_TAG).unwrap_or("0").to_string();
        if let Some(tags) = tags {
            object.tags = user_tags(tags);
        }
        if let Some(data) = data {
            object.data = data;
        }
        object.tags.insert(CREATED_TAG, created);
        object.tags.insert(SIZE_TAG, object.data.len().to_string());
        Ok(())
    }

    async fn find(&self, filter: Tags) -> Result<FindStream, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Find)?;
        let matches: Vec<_> = state
            .objects
            .iter()
            .filter(|(_, object)| object.tags.matches(&filter))
            .map(|(id, object)| {
                Ok(FoundObject {
                    id: *id,
                    tags: object.tags.clone(),
                })
            })
            .collect();
        Ok(stream::iter(matches).boxed())
    }
}
