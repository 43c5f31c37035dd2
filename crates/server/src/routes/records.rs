use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use service::services::{ManagedRecord, RecordService};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

/// CRUD routes for one managed entity, mounted at `prefix`.
pub fn router<T: ManagedRecord>(prefix: &str, svc: Arc<RecordService<T>>) -> Router {
    Router::new()
        .route(prefix, get(list::<T>).post(create::<T>))
        .route(&format!("{prefix}/:id"), get(fetch::<T>).put(update::<T>).delete(remove::<T>))
        .with_state(svc)
}

async fn list<T: ManagedRecord>(State(svc): State<Arc<RecordService<T>>>) -> Result<Json<Vec<T>>, JsonApiError> {
    Ok(Json(svc.list().await?))
}

async fn fetch<T: ManagedRecord>(
    State(svc): State<Arc<RecordService<T>>>,
    Path(id): Path<String>,
) -> Result<Json<T>, JsonApiError> {
    Ok(Json(svc.get(&id).await?))
}

async fn create<T: ManagedRecord>(
    State(svc): State<Arc<RecordService<T>>>,
    ApiJson(record): ApiJson<T>,
) -> Result<(StatusCode, Json<T>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(svc.create(record).await?)))
}

async fn update<T: ManagedRecord>(
    State(svc): State<Arc<RecordService<T>>>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<T>, JsonApiError> {
    Ok(Json(svc.update(&id, patch).await?))
}

async fn remove<T: ManagedRecord>(
    State(svc): State<Arc<RecordService<T>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    svc.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
