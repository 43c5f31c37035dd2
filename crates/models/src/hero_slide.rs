use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{Record, RecordMeta};
use crate::validation::{self, Validate};

/// One slide of the home page hero carousel. Slides render in ascending `order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool { true }

impl Record for HeroSlide {
    const COLLECTION: &'static str = "hero-slides";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for HeroSlide {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("title", &self.title)?;
        validation::require("image", &self.image)?;
        validation::link("image", &self.image)?;
        validation::optional(&self.link, |v| validation::link("link", v))?;
        Ok(())
    }
}

/// Create input: `order` left unset appends the slide after the last one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHeroSlide {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewHeroSlide {
    pub fn into_slide(self, order: u32) -> HeroSlide {
        HeroSlide {
            meta: RecordMeta::default(),
            title: self.title,
            subtitle: self.subtitle,
            image: self.image,
            link: self.link,
            order,
            active: self.active,
        }
    }
}

/// One entry of a bulk reorder request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOrder {
    pub id: String,
    pub order: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slide_defaults_active() {
        let input: NewHeroSlide = serde_json::from_value(serde_json::json!({
            "title": "Umrah Akhir Tahun",
            "image": "/uploads/hero-1.jpg"
        }))
        .unwrap();
        assert!(input.active);
        assert!(input.order.is_none());
        let slide = input.into_slide(3);
        assert_eq!(slide.order, 3);
        assert!(slide.validate().is_ok());
    }

    #[test]
    fn image_must_be_a_link() {
        let slide = NewHeroSlide {
            title: "x".into(),
            subtitle: None,
            image: "hero.jpg".into(),
            link: None,
            order: None,
            active: true,
        }
        .into_slide(0);
        assert!(slide.validate().is_err());
    }
}
