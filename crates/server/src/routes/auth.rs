use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use tracing::warn;

use models::user::Role;
use service::auth::domain::{AuthSession, Claims, LoginInput};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::Auth;

pub async fn login(
    State(auth): State<Arc<Auth>>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    Ok(Json(auth.login(input).await?))
}

/// Checks `Authorization: Bearer <token>` and makes the [`Claims`] available
/// to handlers as a request extension.
pub async fn require_session(
    State(auth): State<Arc<Auth>>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        warn!(path = %req.uri().path(), "missing bearer token");
        return Err(JsonApiError::unauthorized());
    };
    let claims = auth.verify_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Layered inside [`require_session`]; rejects non-admin sessions.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, JsonApiError> {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.role == Role::Admin => Ok(next.run(req).await),
        Some(_) => Err(JsonApiError::forbidden()),
        None => Err(JsonApiError::unauthorized()),
    }
}
