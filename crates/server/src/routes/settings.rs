use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{Map, Value};

use models::settings::SiteSettings;
use service::services::SettingsService;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

pub fn router(svc: Arc<SettingsService>) -> Router {
    Router::new().route("/api/settings", get(fetch).put(save)).with_state(svc)
}

async fn fetch(State(svc): State<Arc<SettingsService>>) -> Result<Json<SiteSettings>, JsonApiError> {
    Ok(Json(svc.get().await?))
}

async fn save(
    State(svc): State<Arc<SettingsService>>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<SiteSettings>, JsonApiError> {
    Ok(Json(svc.save(patch).await?))
}
