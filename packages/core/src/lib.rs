//! Linkdir Core Business Logic Layer
//!
//! Category management for the link-directory admin backend.
//!
//! # Architecture
//!
//! - **Flat storage**: categories persist as a parent-pointer table in libsql
//! - **Request-scoped tree**: every operation builds a `CategoryIndex` from a
//!   fresh snapshot and validates against it before writing
//! - **No shared state**: there is no cached or global tree
//!
//! # Modules
//!
//! - [`models`] - Category rows, request payloads and validation errors
//! - [`category_index`] - In-memory tree, aggregates and move/delete checks
//! - [`db`] - libsql database layer and the `CategoryStore` trait
//! - [`services`] - `CategoryService` and export rendering

pub mod category_index;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use category_index::{CategoryIndex, CategoryIndexError, CategoryNode, CategoryTree, MoveError};
pub use models::*;
pub use services::*;
