use std::{collections::HashSet, marker::PhantomData, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use models::{Record, RecordMeta};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use super::backend::StorageBackend;

/// Fields owned by the store; patches cannot overwrite them.
const MANAGED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: String, id: String },
    #[error("{collection} already contains a record with id {id}")]
    Conflict { collection: String, id: String },
    #[error("malformed {collection} record: {reason}")]
    MalformedRecord { collection: String, reason: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self { Self::Storage(msg.into()) }

    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound { collection: collection.to_string(), id: id.to_string() }
    }

    fn conflict(collection: &str, id: &str) -> Self {
        Self::Conflict { collection: collection.to_string(), id: id.to_string() }
    }

    fn malformed(collection: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord { collection: collection.to_string(), reason: reason.into() }
    }
}

/// Random v4 UUID. Independent of collection length, so a create racing a
/// delete can never hand out an id that is still in use.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// CRUD over named, ordered collections of records.
///
/// Every mutation is a full read-modify-write of the collection document,
/// performed while holding that collection's lock. Different collections
/// never contend. Reads take no lock; the backend only ever exposes whole
/// documents.
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Arc<Self> {
        Arc::new(Self { backend, locks: DashMap::new() })
    }

    /// Typed handle on the collection `T` lives in.
    pub fn collection<T: Record>(self: &Arc<Self>) -> Collection<T> {
        self.collection_named(T::COLLECTION)
    }

    pub fn collection_named<T: Record>(self: &Arc<Self>, name: impl Into<String>) -> Collection<T> {
        Collection { store: Arc::clone(self), name: name.into(), _record: PhantomData }
    }

    /// Whether `collection` holds a record with `id`, regardless of its type.
    pub async fn contains(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let records: Vec<Value> = self.load(collection).await?;
        Ok(records.iter().any(|r| r.get("id").and_then(Value::as_str) == Some(id)))
    }

    /// Number of records in `collection` whose `field` equals `id`.
    pub async fn count_referencing(&self, collection: &str, field: &str, id: &str) -> Result<usize, StoreError> {
        let records: Vec<Value> = self.load(collection).await?;
        Ok(records.iter().filter(|r| r.get(field).and_then(Value::as_str) == Some(id)).count())
    }

    /// Guard serialising changes to references *into* `collection`: adding a
    /// reference to one of its records, or deleting a record that may be
    /// referenced. Always take it before any collection lock.
    pub async fn lock_references(&self, collection: &str) -> OwnedMutexGuard<()> {
        self.lock(&format!("{collection}:refs")).await
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.backend.close().await
    }

    async fn lock(&self, collection: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }

    async fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        let Some(bytes) = self.backend.load(collection).await? else {
            return Ok(Vec::new());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::storage(format!("collection {collection} is corrupt: {e}")))
    }

    async fn persist<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::storage(format!("cannot serialize {collection}: {e}")))?;
        self.backend.store(collection, bytes).await?;
        debug!(collection, count = records.len(), "collection persisted");
        Ok(())
    }
}

/// Typed view of one collection inside a [`RecordStore`].
pub struct Collection<T> {
    store: Arc<RecordStore>,
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), name: self.name.clone(), _record: PhantomData }
    }
}

impl<T: Record> Collection<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whole collection in stored order; empty if it was never written.
    pub async fn read_all(&self) -> Result<Vec<T>, StoreError> {
        self.store.load(&self.name).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.read_all().await?.into_iter().find(|r| r.id() == id))
    }

    /// Append a record. An empty id is replaced with a generated one; a
    /// caller-supplied id must not collide. Both timestamps are set to now.
    pub async fn create(&self, record: T) -> Result<T, StoreError> {
        self.create_with(record, |_: &mut T, _: &[T]| Ok::<(), StoreError>(())).await
    }

    /// [`Collection::create`] with a hook that sees the candidate and the
    /// current records under the collection lock, before anything is written.
    pub async fn create_with<E, F>(&self, mut record: T, check: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut T, &[T]) -> Result<(), E>,
    {
        let _guard = self.store.lock(&self.name).await;
        let mut records: Vec<T> = self.store.load(&self.name).await?;

        if record.id().is_empty() {
            let mut id = generate_id();
            while records.iter().any(|r| r.id() == id) {
                id = generate_id();
            }
            record.meta_mut().id = id;
        } else if records.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::conflict(&self.name, record.id()).into());
        }
        check(&mut record, &records)?;

        let now = Utc::now();
        let meta = record.meta_mut();
        meta.created_at = now;
        meta.updated_at = now;

        records.push(record.clone());
        self.store.persist(&self.name, &records).await?;
        info!(collection = %self.name, id = %record.id(), "record created");
        Ok(record)
    }

    /// Merge `patch` into the record with `id`; see [`Collection::update_with`].
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<T, StoreError> {
        self.update_with(id, patch, |_: &mut T, _: &[T]| Ok::<(), StoreError>(())).await
    }

    /// Field-level merge: keys in `patch` overwrite, absent keys keep their
    /// value, `id`/`createdAt`/`updatedAt` keys are ignored. `finalize` runs on
    /// the merged candidate (alongside the stored records, target included)
    /// before anything is written and may adjust derived fields or reject it.
    /// `updatedAt` always moves strictly forward.
    pub async fn update_with<E, F>(&self, id: &str, patch: Map<String, Value>, finalize: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut T, &[T]) -> Result<(), E>,
    {
        let _guard = self.store.lock(&self.name).await;
        let mut records: Vec<T> = self.store.load(&self.name).await?;
        let pos = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(&self.name, id))?;

        let mut merged = merge(&self.name, &records[pos], patch)?;
        finalize(&mut merged, &records)?;

        let mut meta = records[pos].meta().clone();
        meta.updated_at = next_timestamp(meta.updated_at);
        *merged.meta_mut() = meta;

        records[pos] = merged.clone();
        self.store.persist(&self.name, &records).await?;
        info!(collection = %self.name, %id, "record updated");
        Ok(merged)
    }

    /// [`Collection::update_with`] for a record that may not exist yet: when
    /// `id` is absent the patch is merged into `seed()` instead, and the result
    /// is stored as a new record. Everything runs before the single write, so
    /// a rejected patch leaves the collection untouched.
    pub async fn upsert_with<E, S, F>(&self, id: &str, seed: S, patch: Map<String, Value>, finalize: F) -> Result<T, E>
    where
        E: From<StoreError>,
        S: FnOnce() -> T,
        F: FnOnce(&mut T, &[T]) -> Result<(), E>,
    {
        let _guard = self.store.lock(&self.name).await;
        let mut records: Vec<T> = self.store.load(&self.name).await?;
        let pos = records.iter().position(|r| r.id() == id);

        let (base, meta) = match pos {
            Some(pos) => {
                let mut meta = records[pos].meta().clone();
                meta.updated_at = next_timestamp(meta.updated_at);
                (records[pos].clone(), meta)
            }
            None => {
                let now = Utc::now();
                let meta = RecordMeta { id: id.to_string(), created_at: now, updated_at: now };
                (seed(), meta)
            }
        };
        let mut merged = merge(&self.name, &base, patch)?;
        finalize(&mut merged, &records)?;
        *merged.meta_mut() = meta;

        match pos {
            Some(pos) => records[pos] = merged.clone(),
            None => records.push(merged.clone()),
        }
        self.store.persist(&self.name, &records).await?;
        info!(collection = %self.name, %id, created = pos.is_none(), "record upserted");
        Ok(merged)
    }

    /// Drop the record with `id` and return it.
    pub async fn remove(&self, id: &str) -> Result<T, StoreError> {
        let _guard = self.store.lock(&self.name).await;
        let mut records: Vec<T> = self.store.load(&self.name).await?;
        let pos = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(&self.name, id))?;
        let removed = records.remove(pos);
        self.store.persist(&self.name, &records).await?;
        info!(collection = %self.name, %id, "record removed");
        Ok(removed)
    }

    /// Replace the collection with `records`, verbatim and in the given order.
    pub async fn write_all(&self, records: Vec<T>) -> Result<(), StoreError> {
        self.transform(|_| Ok::<_, StoreError>(records)).await.map(|_| ())
    }

    /// Read-modify-write of the whole sequence under the collection lock.
    /// `f` receives the current records and returns the sequence to persist.
    pub async fn transform<E, F>(&self, f: F) -> Result<Vec<T>, E>
    where
        E: From<StoreError>,
        F: FnOnce(Vec<T>) -> Result<Vec<T>, E>,
    {
        let _guard = self.store.lock(&self.name).await;
        let current: Vec<T> = self.store.load(&self.name).await?;
        let next = f(current)?;
        check_ids(&self.name, &next)?;
        self.store.persist(&self.name, &next).await?;
        info!(collection = %self.name, count = next.len(), "collection rewritten");
        Ok(next)
    }
}

fn check_ids<T: Record>(collection: &str, records: &[T]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for r in records {
        if r.id().is_empty() {
            return Err(StoreError::malformed(collection, "record without id"));
        }
        if !seen.insert(r.id()) {
            return Err(StoreError::conflict(collection, r.id()));
        }
    }
    Ok(())
}

fn merge<T: Record>(collection: &str, current: &T, patch: Map<String, Value>) -> Result<T, StoreError> {
    let mut doc = serde_json::to_value(current)
        .map_err(|e| StoreError::storage(format!("cannot serialize {collection} record: {e}")))?;
    let fields = doc
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(collection, "record is not a JSON object"))?;
    for (key, value) in patch {
        if MANAGED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key, value);
    }
    serde_json::from_value(doc).map_err(|e| StoreError::malformed(collection, e.to_string()))
}

pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
