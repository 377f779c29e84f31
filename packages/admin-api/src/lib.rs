//! Linkdir Admin API
//!
//! axum server exposing category management for the admin UI.
//!
//! - [`api`] - router, endpoints, response envelope and error mapping
//! - [`config`] - environment-driven `ServerConfig`

pub mod api;
pub mod config;

pub use api::{create_router, start_server, AppState, HttpError};
pub use config::ServerConfig;
