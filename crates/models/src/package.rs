use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{PublishStatus, Record, RecordMeta};
use crate::validation::{self, Validate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageCategory {
    #[default]
    Umrah,
    Hajj,
    Tour,
}

/// A travel package offered by an agency. Prices are whole rupiah.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub duration_days: u32,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    pub agency_id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: PackageCategory,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub facilities: Vec<String>,
}

impl Record for Package {
    const COLLECTION: &'static str = "packages";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for Package {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("title", &self.title)?;
        validation::max_len("title", &self.title, 160)?;
        validation::slug("slug", &self.slug)?;
        validation::require("agencyId", &self.agency_id)?;
        if self.price < 0 {
            return Err(ModelError::invalid("price must not be negative"));
        }
        if self.duration_days == 0 {
            return Err(ModelError::invalid("durationDays must be at least 1"));
        }
        validation::optional(&self.image, |v| validation::link("image", v))?;
        if self.facilities.iter().any(|f| f.trim().is_empty()) {
            return Err(ModelError::invalid("facilities must not contain blank entries"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Package {
        serde_json::from_value(json!({
            "title": "Umrah Ramadhan 12 Hari",
            "slug": "umrah-ramadhan-12-hari",
            "price": 35_000_000,
            "durationDays": 12,
            "departureDate": "2025-03-01",
            "agencyId": "agency-1",
            "facilities": ["Hotel bintang 5", "Visa"]
        }))
        .unwrap()
    }

    #[test]
    fn body_without_meta_deserializes() {
        let p = sample();
        assert!(p.meta.id.is_empty());
        assert_eq!(p.status, PublishStatus::Draft);
        assert_eq!(p.category, PackageCategory::Umrah);
        assert_eq!(p.departure_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_bad_fields() {
        let mut p = sample();
        p.price = -1;
        assert!(p.validate().is_err());

        let mut p = sample();
        p.duration_days = 0;
        assert!(p.validate().is_err());

        let mut p = sample();
        p.facilities.push(" ".into());
        assert!(p.validate().is_err());

        let mut p = sample();
        p.image = Some("c:/foto.jpg".into());
        assert!(p.validate().is_err());
    }

    #[test]
    fn serializes_flat_camel_case() {
        let v = serde_json::to_value(sample()).unwrap();
        assert!(v.get("meta").is_none());
        assert!(v.get("id").is_some());
        assert_eq!(v["durationDays"], 12);
        assert_eq!(v["status"], "draft");
    }
}
