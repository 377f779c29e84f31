//! Server configuration
//!
//! Read from the environment at startup:
//!
//! - `ADMIN_API_HOST`: bind address (default `127.0.0.1`)
//! - `ADMIN_API_PORT`: port (default `3001`)
//! - `LINKDIR_DB_PATH`: database file (default `~/.linkdir/database/linkdir.db`)
//! - `CORS_ALLOW_ORIGIN`: comma-separated allowed origins

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;

const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            db_path: default_db_path(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("ADMIN_API_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = lookup("ADMIN_API_PORT")
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let db_path = lookup("LINKDIR_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let cors_origins = lookup("CORS_ALLOW_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        Self {
            host,
            port,
            db_path,
            cors_origins,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        if self.db_path.as_os_str().is_empty() {
            return Err("db_path cannot be empty".to_string());
        }

        for origin in &self.cors_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(format!(
                    "Invalid CORS origin '{}': must start with http:// or https://",
                    origin
                ));
            }
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(format!("Invalid CORS origin '{}'", origin));
            }
        }

        Ok(())
    }
}

/// `~/.linkdir/database/linkdir.db`, relative to the working directory when
/// there is no home directory
fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".linkdir")
        .join("database")
        .join("linkdir.db")
}
