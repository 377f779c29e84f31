//! Admin HTTP API
//!
//! REST endpoints over `CategoryService`, organized as one router per
//! resource merged into the main router.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin admin-api
//! ```
//!
//! # Security
//!
//! - CORS restricted to the configured admin UI origins
//! - No authentication here; the API is expected to sit behind the auth proxy

use axum::{
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use linkdir_core::db::{CategoryStore, DatabaseService, TursoStore};
use linkdir_core::services::CategoryService;

mod category_endpoints;
mod http_error;
mod response;

pub use category_endpoints::parse_id_list;
pub use http_error::HttpError;
pub use response::ApiResponse;

/// Application state shared across all endpoints
///
/// # Write serialization
///
/// `write_lock` serializes create, update and delete handlers so that two
/// requests in this process never validate against the same snapshot and
/// then both write. Other processes writing the same database are not
/// covered. Reads do not take the lock.
#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<CategoryService>,
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(category_service: CategoryService) -> Self {
        Self {
            category_service: Arc::new(category_service),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the main application router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(category_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

/// CORS for the admin UI; origins that are not valid header values are skipped
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(false)
}

/// Open the database, build the services and serve until Ctrl+C
///
/// # Errors
///
/// Returns error if the database cannot be opened or the server fails to
/// bind or start.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let db = Arc::new(DatabaseService::new(config.db_path.clone()).await?);
    let store: Arc<dyn CategoryStore> = Arc::new(TursoStore::new(db));
    let state = AppState::new(CategoryService::new(store.clone()));
    let app = create_router(state, &config.cors_origins);

    let addr = config.bind_address();
    tracing::info!("Admin API listening on http://{}", addr);
    tracing::info!("Database: {}", config.db_path.display());
    tracing::info!("CORS origins: {}", config.cors_origins.join(", "));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await?;
    tracing::info!("Admin API stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
