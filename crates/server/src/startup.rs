use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use configs::AppConfig;
use service::auth::service::AuthConfig;
use service::runtime;
use service::storage::RecordStore;

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn auth_config(cfg: &configs::AuthConfig) -> AuthConfig {
    AuthConfig { jwt_secret: cfg.jwt_secret.clone(), token_ttl_hours: cfg.token_ttl_hours }
}

/// Router over an already opened store. Used by [`run`] and by tests.
pub fn build_app(store: &Arc<RecordStore>, auth: AuthConfig) -> Router {
    let state = ServerState::new(store, auth);
    routes::build_router(state, build_cors())
}

/// Open the record store, seed the first admin if configured, and serve
/// until `shutdown` resolves. The store is closed on the way out.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = runtime::open_store(&cfg.storage.data_dir).await?;
    let state = ServerState::new(&store, auth_config(&cfg.auth));

    match (&cfg.auth.admin_username, &cfg.auth.admin_password) {
        (Some(user), Some(pass)) => {
            if state.auth.bootstrap_admin(user, pass).await?.is_some() {
                info!(username = %user, "admin account seeded");
            }
        }
        _ => warn!("no ADMIN_USERNAME/ADMIN_PASSWORD configured; an empty users collection means nobody can log in"),
    }

    let app = routes::build_router(state, build_cors());
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, data_dir = %cfg.storage.data_dir, "starting admin api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;

    if let Err(e) = store.close().await {
        error!(error = %e, "closing record store failed");
    }
    served?;
    info!("admin api stopped");
    Ok(())
}
