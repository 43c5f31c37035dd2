use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, instrument};

use models::hero_slide::{HeroSlide, NewHeroSlide, SlideOrder};
use models::Validate;

use crate::errors::ServiceError;
use crate::storage::record_store::next_timestamp;
use crate::storage::{Collection, RecordStore};

/// Hero carousel slides, kept in ascending `order`.
pub struct HeroSlideService {
    slides: Collection<HeroSlide>,
}

impl HeroSlideService {
    pub fn new(store: &Arc<RecordStore>) -> Self {
        Self { slides: store.collection::<HeroSlide>() }
    }

    /// Slides sorted by `order`; ties keep their stored order.
    pub async fn list(&self) -> Result<Vec<HeroSlide>, ServiceError> {
        let mut slides = self.slides.read_all().await?;
        slides.sort_by_key(|s| s.order);
        Ok(slides)
    }

    pub async fn get(&self, id: &str) -> Result<HeroSlide, ServiceError> {
        self.slides
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("hero slide"))
    }

    /// Without an explicit `order` the slide goes after the current last one.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewHeroSlide) -> Result<HeroSlide, ServiceError> {
        let explicit = input.order;
        let slide = input.into_slide(explicit.unwrap_or(0));
        slide.validate()?;
        self.slides
            .create_with(slide, |candidate: &mut HeroSlide, existing: &[HeroSlide]| {
                if explicit.is_none() {
                    let mut next = 0;
                    for s in existing {
                        let after = s.order.checked_add(1).ok_or_else(|| {
                            ServiceError::Validation("no order left after the last slide; pass an explicit order".into())
                        })?;
                        next = next.max(after);
                    }
                    candidate.order = next;
                }
                Ok::<(), ServiceError>(())
            })
            .await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<HeroSlide, ServiceError> {
        self.slides
            .update_with(id, patch, |candidate: &mut HeroSlide, _: &[HeroSlide]| {
                candidate.validate()?;
                Ok::<(), ServiceError>(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.slides.remove(id).await?;
        Ok(())
    }

    /// Apply new `order` values and persist the collection sorted by them.
    ///
    /// Every id must exist; slides not mentioned keep their order. Slides whose
    /// order changed get a fresh `updatedAt`. Nothing is written on error.
    #[instrument(skip(self, changes), fields(count = changes.len()))]
    pub async fn reorder(&self, changes: Vec<SlideOrder>) -> Result<Vec<HeroSlide>, ServiceError> {
        let mut seen = HashSet::with_capacity(changes.len());
        for c in &changes {
            if !seen.insert(c.id.as_str()) {
                return Err(ServiceError::Validation(format!("slide {} listed twice", c.id)));
            }
        }
        let wanted: HashMap<String, u32> = changes.into_iter().map(|c| (c.id, c.order)).collect();

        let sorted = self
            .slides
            .transform(|mut slides| {
                for id in wanted.keys() {
                    if !slides.iter().any(|s| &s.meta.id == id) {
                        return Err(ServiceError::NotFound(format!("hero slide {id} not found")));
                    }
                }
                for slide in slides.iter_mut() {
                    if let Some(&order) = wanted.get(&slide.meta.id) {
                        if slide.order != order {
                            slide.order = order;
                            slide.meta.updated_at = next_timestamp(slide.meta.updated_at);
                        }
                    }
                }
                slides.sort_by_key(|s| s.order);
                Ok(slides)
            })
            .await?;
        info!(count = sorted.len(), "hero slides reordered");
        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use models::RecordMeta;

    fn new_slide(title: &str, order: Option<u32>) -> NewHeroSlide {
        NewHeroSlide {
            title: title.into(),
            subtitle: None,
            image: format!("/uploads/{title}.jpg"),
            link: None,
            order,
            active: true,
        }
    }

    fn slide(id: &str, order: u32) -> HeroSlide {
        let mut s = new_slide(id, Some(order)).into_slide(order);
        s.meta = RecordMeta::with_id(id);
        s
    }

    #[tokio::test]
    async fn reorder_swaps_and_persists_sorted() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let raw = store.collection::<HeroSlide>();
        raw.create(slide("A", 0)).await?;
        raw.create(slide("B", 1)).await?;
        let svc = HeroSlideService::new(&store);

        svc.reorder(vec![
            SlideOrder { id: "A".into(), order: 1 },
            SlideOrder { id: "B".into(), order: 0 },
        ])
        .await?;

        assert_eq!(raw.find_by_id("A").await?.map(|s| s.order), Some(1));
        assert_eq!(raw.find_by_id("B").await?.map(|s| s.order), Some(0));
        let ids: Vec<String> = raw.read_all().await?.into_iter().map(|s| s.meta.id).collect();
        assert_eq!(ids, vec!["B".to_string(), "A".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn reorder_with_unknown_id_changes_nothing() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let raw = store.collection::<HeroSlide>();
        let a = raw.create(slide("A", 0)).await?;
        let svc = HeroSlideService::new(&store);

        let res = svc
            .reorder(vec![SlideOrder { id: "A".into(), order: 5 }, SlideOrder { id: "Z".into(), order: 0 }])
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(raw.read_all().await?, vec![a]);

        let dup = svc
            .reorder(vec![SlideOrder { id: "A".into(), order: 1 }, SlideOrder { id: "A".into(), order: 2 }])
            .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn reorder_refreshes_updated_at_only_for_moved_slides() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let raw = store.collection::<HeroSlide>();
        let a = raw.create(slide("A", 0)).await?;
        let b = raw.create(slide("B", 1)).await?;
        let svc = HeroSlideService::new(&store);

        let sorted = svc
            .reorder(vec![SlideOrder { id: "A".into(), order: 0 }, SlideOrder { id: "B".into(), order: 7 }])
            .await?;
        assert_eq!(sorted[0].meta.updated_at, a.meta.updated_at);
        assert!(sorted[1].meta.updated_at > b.meta.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn create_appends_after_last_slide_by_default() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = HeroSlideService::new(&store);
        assert_eq!(svc.create(new_slide("first", None)).await?.order, 0);
        assert_eq!(svc.create(new_slide("pinned", Some(10))).await?.order, 10);
        assert_eq!(svc.create(new_slide("next", None)).await?.order, 11);

        let titles: Vec<String> = svc.list().await?.into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["first", "pinned", "next"]);
        Ok(())
    }

    #[tokio::test]
    async fn append_after_max_order_is_rejected() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = HeroSlideService::new(&store);
        svc.create(new_slide("last", Some(u32::MAX))).await?;

        let res = svc.create(new_slide("overflow", None)).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(svc.list().await?.len(), 1);
        assert_eq!(svc.create(new_slide("explicit", Some(3))).await?.order, 3);
        Ok(())
    }

    #[tokio::test]
    async fn update_validates_merged_slide() -> Result<(), anyhow::Error> {
        let store = RecordStore::new(MemoryBackend::new());
        let svc = HeroSlideService::new(&store);
        let s = svc.create(new_slide("promo", None)).await?;
        let patch = serde_json::json!({"image": "not-a-link"}).as_object().cloned().unwrap();
        assert!(matches!(svc.update(&s.meta.id, patch).await, Err(ServiceError::Model(_))));
        Ok(())
    }
}
