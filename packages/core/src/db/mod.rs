//! Database Layer
//!
//! Persistence for the flat `categories` table using embedded libsql:
//!
//! - `DatabaseService` - connection management, schema and raw SQL
//! - `CategoryStore` - async trait the services depend on
//! - `TursoStore` - `CategoryStore` over `DatabaseService`

mod category_store;
mod database;
mod error;
mod turso_store;

pub use category_store::CategoryStore;
pub use database::{DatabaseService, DbCreateCategoryParams, DbUpdateCategoryParams};
pub use error::DatabaseError;
pub use turso_store::TursoStore;
