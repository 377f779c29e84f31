//! Admin API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Defaults: port 3001, ~/.linkdir/database/linkdir.db
//! cargo run --bin admin-api
//!
//! # Custom port and database
//! ADMIN_API_PORT=3002 LINKDIR_DB_PATH=/tmp/linkdir.db cargo run --bin admin-api
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_API_HOST`, `ADMIN_API_PORT`: bind address (default `127.0.0.1:3001`)
//! - `LINKDIR_DB_PATH`: database file
//! - `CORS_ALLOW_ORIGIN`: comma-separated allowed origins
//! - `RUST_LOG`: logging level (e.g., "info", "debug", "trace")

use linkdir_admin_api::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Linkdir Admin API");

    let config = ServerConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing::info!("Port: {}", config.port);

    start_server(config).await
}
