use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use models::user::UserView;
use service::services::users::{NewUser, UserUpdate};
use service::services::UserService;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::require_admin;

/// Account management; admin sessions only.
pub fn router(svc: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", get(list).post(create))
        .route("/api/users/:id", get(fetch).put(update).delete(remove))
        .route_layer(middleware::from_fn(require_admin))
        .with_state(svc)
}

async fn list(State(svc): State<Arc<UserService>>) -> Result<Json<Vec<UserView>>, JsonApiError> {
    Ok(Json(svc.list().await?))
}

async fn fetch(State(svc): State<Arc<UserService>>, Path(id): Path<String>) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(svc.get(&id).await?))
}

async fn create(
    State(svc): State<Arc<UserService>>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<UserView>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(svc.create(input).await?)))
}

async fn update(
    State(svc): State<Arc<UserService>>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<UserUpdate>,
) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(svc.update(&id, changes).await?))
}

async fn remove(State(svc): State<Arc<UserService>>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    svc.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
