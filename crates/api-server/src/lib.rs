pub use common::logging_stdout;
use std::{net::SocketAddr, sync::Arc};
use storage::Storage;
use tracing::info;
use volo_http::Address;
use volo_http::server::{Router, Server, middleware::from_fn};
use volo_http::utils::Extension;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod tools;

pub use auth::{AuthConfig, Authenticator};
pub use middleware::CorsConfig;

/// Everything the router needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub auth:    Arc<Authenticator>,
    pub cors:    Arc<CorsConfig>,
}

impl AppState {
    pub fn new(storage: Storage, auth: Authenticator, cors: CorsConfig) -> Self {
        Self {
            storage,
            auth: Arc::new(auth),
            cors: Arc::new(cors),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::recipes_router())
        .layer(from_fn(auth::require_auth))
        .merge(handlers::metrics_router())
        .layer(from_fn(middleware::track_metrics))
        .layer(from_fn(middleware::cors))
        .layer(Extension(state.storage))
        .layer(Extension(state.auth))
        .layer(Extension(state.cors))
}

pub async fn run_api_server(addr: SocketAddr, state: AppState) -> error::Result<()> {
    let app = build_router(state);
    info!(%addr, "recipes api listening");
    let addr = Address::from(addr);
    Server::new(app)
        .run(addr)
        .await
        .map_err(|e| error::Error::Server(e.to_string().into()))
}
