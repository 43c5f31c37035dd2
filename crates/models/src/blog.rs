use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{PublishStatus, Record, RecordMeta};
use crate::validation::{self, Validate};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Record for BlogPost {
    const COLLECTION: &'static str = "blog-posts";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for BlogPost {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("title", &self.title)?;
        validation::max_len("title", &self.title, 200)?;
        validation::slug("slug", &self.slug)?;
        validation::max_len("excerpt", &self.excerpt, 300)?;
        validation::optional(&self.cover_image, |v| validation::link("coverImage", v))?;
        if self.status == PublishStatus::Published {
            validation::require("content", &self.content)?;
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ModelError::invalid("tags must not contain blank entries"));
        }
        Ok(())
    }
}
