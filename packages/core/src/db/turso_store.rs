//! TursoStore - CategoryStore Implementation for libsql
//!
//! Thin wrapper around `DatabaseService`: every method delegates to a `db_*`
//! method and converts `libsql::Row` values into models. No tree rules here.

use crate::db::category_store::CategoryStore;
use crate::db::{DatabaseService, DbCreateCategoryParams, DbUpdateCategoryParams};
use crate::models::{Category, CategoryRecord, CategoryUpdate, NewCategory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use libsql::Row;
use std::sync::Arc;
use tracing::debug;

/// CategoryStore backed by an embedded libsql database
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Convert a row selected with the record columns
    ///
    /// Expected columns: id, parent_id, name, slug, order_index
    fn row_to_record(row: &Row) -> Result<CategoryRecord> {
        Ok(CategoryRecord {
            id: row.get(0).context("Failed to get id")?,
            parent_id: row.get(1).context("Failed to get parent_id")?,
            name: row.get(2).context("Failed to get name")?,
            slug: row.get(3).context("Failed to get slug")?,
            order_index: row.get(4).context("Failed to get order_index")?,
        })
    }

    /// Convert a row selected with all category columns
    ///
    /// Expected columns: id, parent_id, name, slug, order_index, title, content
    fn row_to_category(row: &Row) -> Result<Category> {
        Ok(Category {
            id: row.get(0).context("Failed to get id")?,
            parent_id: row.get(1).context("Failed to get parent_id")?,
            name: row.get(2).context("Failed to get name")?,
            slug: row.get(3).context("Failed to get slug")?,
            order_index: row.get(4).context("Failed to get order_index")?,
            title: row.get(5).context("Failed to get title")?,
            content: row.get(6).context("Failed to get content")?,
        })
    }
}

#[async_trait]
impl CategoryStore for TursoStore {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>> {
        let mut rows = self
            .db
            .db_list_categories()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list categories: {}", e))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_record(&row)?);
        }

        Ok(records)
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let mut rows = self
            .db
            .db_list_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list categories: {}", e))?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(Self::row_to_category(&row)?);
        }

        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        match self
            .db
            .db_get_category(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get category: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        self.db
            .db_find_id_by_name(name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up category by name: {}", e))
    }

    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<i64>> {
        self.db
            .db_find_id_by_slug(slug)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up category by slug: {}", e))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let params = DbCreateCategoryParams {
            parent_id: category.parent_id,
            name: &category.name,
            slug: &category.slug,
            order_index: category.order_index,
            title: category.title.as_deref(),
            content: category.content.as_deref(),
        };

        let id = self
            .db
            .db_create_category(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create category: {}", e))?;

        debug!("Created category {} under parent {}", id, category.parent_id);

        self.get_category(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found after creation"))
    }

    async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Option<Category>> {
        let Some(current) = self.get_category(id).await? else {
            return Ok(None);
        };

        let updated = Category {
            id,
            parent_id: update.parent_id.unwrap_or(current.parent_id),
            name: update.name.unwrap_or(current.name),
            slug: update.slug.unwrap_or(current.slug),
            order_index: update.order_index.unwrap_or(current.order_index),
            title: update.title.or(current.title),
            content: update.content.or(current.content),
        };

        let params = DbUpdateCategoryParams {
            id,
            parent_id: updated.parent_id,
            name: &updated.name,
            slug: &updated.slug,
            order_index: updated.order_index,
            title: updated.title.as_deref(),
            content: updated.content.as_deref(),
        };

        let affected = self
            .db
            .db_update_category(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update category: {}", e))?;

        if affected == 0 {
            return Ok(None);
        }

        debug!("Updated category {} (parent {})", id, updated.parent_id);

        self.get_category(id).await
    }

    async fn delete_categories(&self, ids: &[i64]) -> Result<u64> {
        let removed = self
            .db
            .db_delete_categories(ids)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete categories: {}", e))?;

        debug!("Deleted {} of {} requested categories", removed, ids.len());

        Ok(removed)
    }

    async fn close(&self) -> Result<()> {
        self.db
            .db_close()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to close database: {}", e))?;

        Ok(())
    }
}
