//! Category Service
//!
//! Orchestrates the store and the tree index for every admin operation.
//!
//! Each call reads a fresh snapshot, builds a [`CategoryIndex`], validates
//! the request against it and only then writes. The index is dropped when
//! the call returns.
//!
//! # Concurrency
//!
//! The snapshot read and the write are separate store calls. Two requests
//! validated against the same snapshot can both commit; for moves this can
//! leave a parent cycle in the table. The next build reports it as
//! [`CategoryIndexError::CycleDetected`](crate::category_index::CategoryIndexError)
//! rather than looping. Callers that need stronger guarantees serialize
//! writes themselves (the HTTP layer holds a write lock).

use crate::category_index::{CategoryIndex, CategoryTree, MoveError};
use crate::db::CategoryStore;
use crate::models::{
    Category, CategoryInput, CategoryUpdate, NewCategory, ValidationErrors, ROOT_CATEGORY_ID,
};
use crate::services::error::CategoryServiceError;
use crate::services::export::{export_file_name, render_csv, ExportFile, ExportFormat};
use chrono::Local;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Tree listing plus the number of categories it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub tree: CategoryTree,
    pub total_count: usize,
}

/// Business operations over the category tree
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CategoryStore> {
        &self.store
    }

    /// Read a fresh snapshot and build the index from it
    pub async fn load_index(&self) -> Result<CategoryIndex, CategoryServiceError> {
        let records = self
            .store
            .list_categories()
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?;

        Ok(CategoryIndex::build(records)?)
    }

    /// Nested tree of all categories, optionally without one subtree
    ///
    /// `except_category_id` prunes that category and its descendants; the
    /// admin UI uses it to list valid move destinations.
    pub async fn list_tree(
        &self,
        except_category_id: Option<i64>,
    ) -> Result<CategoryListing, CategoryServiceError> {
        let index = self.load_index().await?;

        let tree = match except_category_id {
            Some(id) => index.tree_excluding(id),
            None => index.tree(),
        };

        Ok(CategoryListing {
            tree,
            total_count: index.len(),
        })
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.store
            .get_category(id)
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?
            .ok_or_else(|| CategoryServiceError::not_found(id))
    }

    /// Create a category as the last child of its parent
    ///
    /// `parent_id` is required; `0` creates a top-level category.
    pub async fn create_category(
        &self,
        input: CategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut errors = input.validate_fields();
        self.check_unique(&input, None, &mut errors).await?;

        let index = self.load_index().await?;
        let parent_id = input.parent_id.unwrap_or(ROOT_CATEGORY_ID);
        if !errors.has("parent_id") && parent_id != ROOT_CATEGORY_ID && !index.contains(parent_id)
        {
            errors.add("parent_id", "The selected parent id is invalid.");
        }
        errors.into_result()?;

        let new_category = NewCategory {
            parent_id,
            name: trimmed(input.name),
            slug: trimmed(input.slug),
            order_index: index.next_order_index(parent_id),
            title: input.title,
            content: input.content,
        };

        let created = self
            .store
            .create_category(new_category)
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?;

        tracing::info!(
            "Created category {} '{}' under parent {}",
            created.id,
            created.slug,
            created.parent_id
        );

        Ok(created)
    }

    /// Update a category, moving it when `parent_id` changes
    ///
    /// `parent_id` is required like on create. A move appends the category
    /// after the last child of its new parent.
    pub async fn update_category(
        &self,
        id: i64,
        input: CategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let index = self.load_index().await?;
        let current = index
            .get_by_id(id)
            .ok_or_else(|| CategoryServiceError::not_found(id))?;
        let current_parent = current.parent_id.unwrap_or(ROOT_CATEGORY_ID);

        let mut errors = input.validate_fields();
        self.check_unique(&input, Some(id), &mut errors).await?;

        let new_parent = input.parent_id.unwrap_or(current_parent);
        if !errors.has("parent_id") {
            match index.validate_move(id, new_parent) {
                Ok(()) => {}
                Err(MoveError::SourceNotFound { .. }) => {
                    return Err(CategoryServiceError::not_found(id));
                }
                Err(err) => {
                    tracing::warn!("Rejected move of category {}: {}", id, err);
                    errors.add("parent_id", err.to_string());
                }
            }
        }
        errors.into_result()?;

        let order_index =
            (new_parent != current_parent).then(|| index.next_order_index(new_parent));

        let update = CategoryUpdate {
            parent_id: Some(new_parent),
            name: Some(trimmed(input.name)),
            slug: Some(trimmed(input.slug)),
            order_index,
            title: input.title,
            content: input.content,
        };

        let updated = self
            .store
            .update_category(id, update)
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?
            .ok_or_else(|| CategoryServiceError::not_found(id))?;

        if new_parent != current_parent {
            tracing::info!(
                "Moved category {} from parent {} to {}",
                id,
                current_parent,
                new_parent
            );
        }

        Ok(updated)
    }

    /// Delete a category and everything below it
    ///
    /// Returns the number of rows removed.
    pub async fn delete_category(&self, id: i64) -> Result<u64, CategoryServiceError> {
        let index = self.load_index().await?;
        if !index.contains(id) {
            return Err(CategoryServiceError::not_found(id));
        }

        self.delete_with_descendants(&index, &[id]).await
    }

    /// Delete several categories and everything below them
    ///
    /// Unknown ids are ignored, so repeating a batch is harmless.
    pub async fn delete_categories(&self, ids: &[i64]) -> Result<u64, CategoryServiceError> {
        if ids.is_empty() {
            return Err(CategoryServiceError::invalid_ids("The ids field is required."));
        }
        if let Some(bad) = ids.iter().find(|id| **id <= 0) {
            return Err(CategoryServiceError::invalid_ids(format!(
                "Every id must be a positive integer, got {}",
                bad
            )));
        }

        let index = self.load_index().await?;
        self.delete_with_descendants(&index, ids).await
    }

    async fn delete_with_descendants(
        &self,
        index: &CategoryIndex,
        ids: &[i64],
    ) -> Result<u64, CategoryServiceError> {
        let mut doomed: BTreeSet<i64> = index.collect_deletion_set(ids.iter().copied());
        doomed.extend(ids.iter().copied());
        let doomed: Vec<i64> = doomed.into_iter().collect();

        let removed = self
            .store
            .delete_categories(&doomed)
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?;

        tracing::info!(
            "Deleted {} categories for request {:?}",
            removed,
            ids
        );

        Ok(removed)
    }

    /// Render all categories in `format`
    pub async fn export(&self, format: ExportFormat) -> Result<ExportFile, CategoryServiceError> {
        if format == ExportFormat::Pdf {
            return Err(CategoryServiceError::unsupported_export_format(
                format.to_string(),
            ));
        }

        let categories = self
            .store
            .list_all()
            .await
            .map_err(|e| CategoryServiceError::store(e.to_string()))?;

        Ok(ExportFile {
            file_name: export_file_name(Local::now().date_naive(), format),
            content_type: format.content_type(),
            body: render_csv(&categories)?,
        })
    }

    /// Add "already taken" errors for `name`/`slug` owned by another category
    async fn check_unique(
        &self,
        input: &CategoryInput,
        own_id: Option<i64>,
        errors: &mut ValidationErrors,
    ) -> Result<(), CategoryServiceError> {
        if !errors.has("name") {
            if let Some(name) = input.name.as_deref() {
                let owner = self
                    .store
                    .find_id_by_name(name.trim())
                    .await
                    .map_err(|e| CategoryServiceError::store(e.to_string()))?;
                if owner.is_some() && owner != own_id {
                    errors.add("name", "The name has already been taken.");
                }
            }
        }

        if !errors.has("slug") {
            if let Some(slug) = input.slug.as_deref() {
                let owner = self
                    .store
                    .find_id_by_slug(slug.trim())
                    .await
                    .map_err(|e| CategoryServiceError::store(e.to_string()))?;
                if owner.is_some() && owner != own_id {
                    errors.add("slug", "The slug has already been taken.");
                }
            }
        }

        Ok(())
    }
}

/// Trimmed text of a field that already passed the required check
fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
