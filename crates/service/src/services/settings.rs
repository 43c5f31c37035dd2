use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::instrument;

use models::settings::{SiteSettings, SITE_SETTINGS_ID};
use models::Validate;

use crate::errors::ServiceError;
use crate::storage::{Collection, RecordStore};

/// Site-wide settings, stored as a single record.
pub struct SettingsService {
    settings: Collection<SiteSettings>,
}

impl SettingsService {
    pub fn new(store: &Arc<RecordStore>) -> Self {
        Self { settings: store.collection::<SiteSettings>() }
    }

    /// Saved settings, or the defaults if nothing was saved yet.
    pub async fn get(&self) -> Result<SiteSettings, ServiceError> {
        Ok(self.settings.find_by_id(SITE_SETTINGS_ID).await?.unwrap_or_default())
    }

    /// Merge `patch` into the settings, creating the record on first save.
    /// Validation runs on the merged result before anything is written.
    #[instrument(skip(self, patch))]
    pub async fn save(&self, patch: Map<String, Value>) -> Result<SiteSettings, ServiceError> {
        self.settings
            .upsert_with(
                SITE_SETTINGS_ID,
                SiteSettings::default,
                patch,
                |candidate: &mut SiteSettings, _: &[SiteSettings]| {
                    candidate.validate()?;
                    Ok::<(), ServiceError>(())
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use serde_json::json;

    fn patch(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn unsaved_settings_fall_back_to_defaults() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = SettingsService::new(&store);
        assert_eq!(svc.get().await?.site_name, "Tripbaitullah");
        assert!(store.collection::<SiteSettings>().read_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_once_then_merges() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = SettingsService::new(&store);
        svc.save(patch(json!({"tagline": "Teman ibadah Anda", "whatsapp": "+6281234567890"}))).await?;
        let saved = svc.save(patch(json!({"contactEmail": "cs@tripbaitullah.com"}))).await?;

        assert_eq!(saved.tagline, "Teman ibadah Anda");
        assert_eq!(saved.whatsapp.as_deref(), Some("+6281234567890"));
        assert_eq!(saved.contact_email.as_deref(), Some("cs@tripbaitullah.com"));
        assert_eq!(store.collection::<SiteSettings>().read_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = SettingsService::new(&store);
        let res = svc.save(patch(json!({"siteName": "  "}))).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));
        assert_eq!(svc.get().await?.site_name, "Tripbaitullah");
        assert!(store.collection::<SiteSettings>().read_all().await?.is_empty());

        svc.save(patch(json!({"tagline": "Umroh hemat"}))).await?;
        let res = svc.save(patch(json!({"siteName": ""}))).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));
        assert_eq!(svc.get().await?.tagline, "Umroh hemat");
        Ok(())
    }
}
