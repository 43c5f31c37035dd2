use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Store-managed fields shared by every record.
///
/// Serialized flattened into the owning record, so on disk a record looks like
/// `{"id": "...", "createdAt": "...", "updatedAt": "...", ...fields}`.
/// All three default when absent so request bodies can omit them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Meta carrying a caller-chosen id; timestamps are stamped by the store.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }
}

/// Capability every stored entity implements.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name; maps 1:1 to a storage document.
    const COLLECTION: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }
}

/// Publication state shared by packages and blog posts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_defaults_when_missing() {
        let meta: RecordMeta = serde_json::from_str("{}").unwrap();
        assert!(meta.id.is_empty());
        assert_eq!(meta.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn meta_uses_camel_case_iso_timestamps() {
        let meta: RecordMeta = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "createdAt": "2024-03-01T08:30:00Z",
            "updatedAt": "2024-03-02T08:30:00.123Z"
        }))
        .unwrap();
        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["id"], "a1");
        assert!(back["createdAt"].as_str().unwrap().starts_with("2024-03-01T08:30:00"));
        assert!(back.get("created_at").is_none());
    }

    #[test]
    fn publish_status_is_lowercase() {
        assert_eq!(serde_json::to_value(PublishStatus::Published).unwrap(), "published");
        assert!(serde_json::from_str::<PublishStatus>("\"archived\"").is_err());
    }
}
