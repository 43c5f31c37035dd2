use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::OwnedMutexGuard;
use tracing::instrument;

use models::agency::Agency;
use models::blog::BlogPost;
use models::package::Package;
use models::validation::slugify;
use models::{PublishStatus, Record, RecordMeta, Validate};

use crate::errors::ServiceError;
use crate::storage::{Collection, RecordStore};

/// Entity that can be managed through a [`RecordService`].
pub trait ManagedRecord: Record + Validate {
    /// Singular name used in messages.
    const ENTITY: &'static str;

    /// `(field, collection)` pairs: the field holds the id of a record that
    /// must exist in that collection.
    const REFERENCES: &'static [(&'static str, &'static str)] = &[];

    /// `(collection, field)` pairs pointing back at this entity. A record is
    /// not deleted while any of them still holds its id.
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[];

    /// Fill derived fields before validation.
    fn prepare(&mut self) {}

    /// Field whose value must be unique across the collection.
    fn unique_key(&self) -> Option<(&'static str, &str)> {
        None
    }
}

impl ManagedRecord for Package {
    const ENTITY: &'static str = "package";
    const REFERENCES: &'static [(&'static str, &'static str)] = &[("agencyId", Agency::COLLECTION)];

    fn prepare(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("slug", &self.slug))
    }
}

impl ManagedRecord for Agency {
    const ENTITY: &'static str = "agency";
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[(Package::COLLECTION, "agencyId")];

    fn prepare(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("slug", &self.slug))
    }
}

impl ManagedRecord for BlogPost {
    const ENTITY: &'static str = "blog post";

    fn prepare(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
        if self.status == PublishStatus::Published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("slug", &self.slug))
    }
}

/// Validated CRUD for one entity type.
pub struct RecordService<T> {
    store: Arc<RecordStore>,
    records: Collection<T>,
}

impl<T: ManagedRecord> RecordService<T> {
    pub fn new(store: Arc<RecordStore>) -> Self {
        let records = store.collection::<T>();
        Self { store, records }
    }

    pub async fn list(&self) -> Result<Vec<T>, ServiceError> {
        Ok(self.records.read_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<T, ServiceError> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(T::ENTITY))
    }

    /// Store-managed fields in `record` are discarded; the store assigns them.
    #[instrument(skip(self, record), fields(collection = T::COLLECTION))]
    pub async fn create(&self, mut record: T) -> Result<T, ServiceError> {
        *record.meta_mut() = RecordMeta::default();
        record.prepare();
        record.validate()?;
        let doc = serde_json::to_value(&record).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let fields = doc.as_object().cloned().unwrap_or_default();
        let _refs = self.lock_referenced(&fields).await;
        self.check_references(&fields).await?;
        self.records
            .create_with(record, |candidate: &mut T, existing: &[T]| ensure_unique(candidate, existing))
            .await
    }

    #[instrument(skip(self, patch), fields(collection = T::COLLECTION))]
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<T, ServiceError> {
        let _refs = self.lock_referenced(&patch).await;
        self.check_references(&patch).await?;
        self.records
            .update_with(id, patch, |candidate: &mut T, existing: &[T]| {
                candidate.prepare();
                candidate.validate()?;
                ensure_unique(candidate, existing)
            })
            .await
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let _refs = match T::REFERENCED_BY {
            [] => None,
            _ => Some(self.store.lock_references(T::COLLECTION).await),
        };
        for (collection, field) in T::REFERENCED_BY {
            let n = self.store.count_referencing(collection, field, id).await?;
            if n > 0 {
                return Err(ServiceError::Conflict(format!(
                    "{} {id} is still used by {n} {collection} record(s)",
                    T::ENTITY
                )));
            }
        }
        self.records.remove(id).await?;
        Ok(())
    }

    /// Hold the reference guard of every collection `fields` points into, so
    /// the targets cannot be deleted until the write lands.
    async fn lock_referenced(&self, fields: &Map<String, Value>) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::new();
        for (field, collection) in T::REFERENCES {
            if fields.contains_key(*field) {
                guards.push(self.store.lock_references(collection).await);
            }
        }
        guards
    }

    async fn check_references(&self, fields: &Map<String, Value>) -> Result<(), ServiceError> {
        for (field, collection) in T::REFERENCES {
            let Some(value) = fields.get(*field) else { continue };
            let id = value
                .as_str()
                .ok_or_else(|| ServiceError::Validation(format!("{field} must be a string")))?;
            if !self.store.contains(collection, id).await? {
                return Err(ServiceError::Validation(format!("{field} refers to unknown {collection} record {id}")));
            }
        }
        Ok(())
    }
}

fn ensure_unique<T: ManagedRecord>(candidate: &T, existing: &[T]) -> Result<(), ServiceError> {
    let Some((field, value)) = candidate.unique_key() else {
        return Ok(());
    };
    let taken = existing
        .iter()
        .filter(|r| r.id() != candidate.id())
        .any(|r| r.unique_key().map(|(_, v)| v) == Some(value));
    if taken {
        return Err(ServiceError::Conflict(format!("{} with {field} {value:?} already exists", T::ENTITY)));
    }
    Ok(())
}
