use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{Record, RecordMeta};
use crate::validation::{self, Validate};

/// Id of the single record kept in the settings collection.
pub const SITE_SETTINGS_ID: &str = "site";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            meta: RecordMeta::with_id(SITE_SETTINGS_ID),
            site_name: "Tripbaitullah".into(),
            tagline: String::new(),
            contact_email: None,
            contact_phone: None,
            whatsapp: None,
            address: None,
            social_links: SocialLinks::default(),
        }
    }
}

impl Record for SiteSettings {
    const COLLECTION: &'static str = "settings";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for SiteSettings {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("siteName", &self.site_name)?;
        validation::optional(&self.contact_email, |v| validation::email("contactEmail", v))?;
        let s = &self.social_links;
        for (field, value) in [
            ("socialLinks.facebook", &s.facebook),
            ("socialLinks.instagram", &s.instagram),
            ("socialLinks.youtube", &s.youtube),
            ("socialLinks.tiktok", &s.tiktok),
        ] {
            validation::optional(value, |v| validation::link(field, v))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = SiteSettings::default();
        assert_eq!(s.meta.id, SITE_SETTINGS_ID);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn social_links_must_be_urls() {
        let mut s = SiteSettings::default();
        s.social_links.instagram = Some("@tripbaitullah".into());
        assert!(s.validate().is_err());
        s.social_links.instagram = Some("https://instagram.com/tripbaitullah".into());
        assert!(s.validate().is_ok());
    }
}
