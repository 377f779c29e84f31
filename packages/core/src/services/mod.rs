//! Business Services
//!
//! - `CategoryService` - create, update, move, delete and list categories,
//!   validating every write against a freshly built `CategoryIndex`
//! - `export` - CSV rendering for the category export download
//!
//! Services sit between the HTTP layer and the `CategoryStore`.

pub mod category_service;
pub mod error;
pub mod export;

pub use category_service::{CategoryListing, CategoryService};
pub use error::CategoryServiceError;
pub use export::{ExportFile, ExportFormat};
