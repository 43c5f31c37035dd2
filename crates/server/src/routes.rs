use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

pub mod auth;
pub mod hero_slides;
pub mod records;
pub mod settings;
pub mod users;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public health/login plus the
/// token-protected admin API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let protected: Router = Router::new()
        .merge(records::router("/api/packages", state.packages.clone()))
        .merge(records::router("/api/agencies", state.agencies.clone()))
        .merge(records::router("/api/blog", state.blog.clone()))
        .merge(hero_slides::router(state.hero_slides.clone()))
        .merge(settings::router(state.settings.clone()))
        .merge(users::router(state.users.clone()))
        .route_layer(middleware::from_fn_with_state(state.auth.clone(), auth::require_session));

    let public: Router = Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.auth.clone());

    public
        .merge(protected)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
