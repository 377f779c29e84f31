//! CategoryStore Trait - Persistence Abstraction
//!
//! The seam between `CategoryService` (tree rules) and the database. The
//! service reads a full snapshot, builds a `CategoryIndex`, checks the
//! request, then writes through this trait.
//!
//! # Design Decisions
//!
//! 1. **Async-first**: every method is async
//! 2. **Ownership**: write methods take their payload by value
//! 3. **Error handling**: `anyhow::Result` for flexible context
//! 4. **No transactions across calls**: the read-check-write sequence is not
//!    atomic, so two writers may both pass validation on the same snapshot
//!
//! # Examples
//!
//! ```rust,no_run
//! use linkdir_core::db::{CategoryStore, DatabaseService, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/linkdir.db")).await?);
//!     let store: Arc<dyn CategoryStore> = Arc::new(TursoStore::new(db));
//!
//!     let snapshot = store.list_categories().await?;
//!     println!("{} categories", snapshot.len());
//!     Ok(())
//! }
//! ```

use crate::models::{Category, CategoryRecord, CategoryUpdate, NewCategory};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence operations for the `categories` table
///
/// Implementations must be `Send + Sync` so the store can be shared across
/// request handlers.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Tree projection of every category, ordered by `(parent_id, order_index)`
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>>;

    /// Every full row ordered by id
    async fn list_all(&self) -> Result<Vec<Category>>;

    /// Full row by id; `Ok(None)` when absent
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;

    async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>>;

    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<i64>>;

    /// Insert and return the stored row with its assigned id
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    /// Apply a sparse update; `Ok(None)` when the id does not exist
    async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Option<Category>>;

    /// Delete every id in one batch and return how many rows were removed
    async fn delete_categories(&self, ids: &[i64]) -> Result<u64>;

    /// Flush pending writes before shutdown
    async fn close(&self) -> Result<()>;
}
