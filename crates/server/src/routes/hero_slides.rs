use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{Map, Value};

use models::hero_slide::{HeroSlide, NewHeroSlide, SlideOrder};
use service::services::HeroSlideService;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

pub fn router(svc: Arc<HeroSlideService>) -> Router {
    Router::new()
        .route("/api/hero-slides", get(list).post(create))
        .route("/api/hero-slides/reorder", put(reorder))
        .route("/api/hero-slides/:id", get(fetch).put(update).delete(remove))
        .with_state(svc)
}

async fn list(State(svc): State<Arc<HeroSlideService>>) -> Result<Json<Vec<HeroSlide>>, JsonApiError> {
    Ok(Json(svc.list().await?))
}

async fn fetch(State(svc): State<Arc<HeroSlideService>>, Path(id): Path<String>) -> Result<Json<HeroSlide>, JsonApiError> {
    Ok(Json(svc.get(&id).await?))
}

async fn create(
    State(svc): State<Arc<HeroSlideService>>,
    ApiJson(input): ApiJson<NewHeroSlide>,
) -> Result<(StatusCode, Json<HeroSlide>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(svc.create(input).await?)))
}

async fn update(
    State(svc): State<Arc<HeroSlideService>>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<HeroSlide>, JsonApiError> {
    Ok(Json(svc.update(&id, patch).await?))
}

async fn remove(State(svc): State<Arc<HeroSlideService>>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    svc.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body: `[{"id": "...", "order": 0}, ...]`. Responds with every slide in the
/// new order.
async fn reorder(
    State(svc): State<Arc<HeroSlideService>>,
    ApiJson(changes): ApiJson<Vec<SlideOrder>>,
) -> Result<Json<Vec<HeroSlide>>, JsonApiError> {
    Ok(Json(svc.reorder(changes).await?))
}
