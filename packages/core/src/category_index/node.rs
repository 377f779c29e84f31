//! Tree node stored in the index arena

use crate::models::{CategoryRecord, ROOT_CATEGORY_ID};

/// A category plus the aggregates computed while linking the tree.
///
/// Relationships are id references resolved through the owning
/// [`CategoryIndex`](super::CategoryIndex); nodes never point at each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: i64,
    /// `None` only for the root sentinel
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub order_index: i64,

    /// Direct children in snapshot order
    pub children: Vec<i64>,
    pub children_ids: Vec<i64>,
    pub children_count: usize,
    pub recursive_children_ids: Vec<i64>,
    pub recursive_children_count: usize,

    /// Depth below the root sentinel; top-level categories are level 1
    pub level: u32,
}

impl CategoryNode {
    pub(crate) fn root() -> Self {
        Self {
            id: ROOT_CATEGORY_ID,
            parent_id: None,
            name: "Root".to_string(),
            slug: "root".to_string(),
            order_index: 0,
            children: Vec::new(),
            children_ids: Vec::new(),
            children_count: 0,
            recursive_children_ids: Vec::new(),
            recursive_children_count: 0,
            level: 0,
        }
    }

    pub(crate) fn from_record(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            parent_id: Some(record.parent_id),
            name: record.name,
            slug: record.slug,
            order_index: record.order_index,
            children: Vec::new(),
            children_ids: Vec::new(),
            children_count: 0,
            recursive_children_ids: Vec::new(),
            recursive_children_count: 0,
            level: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_descendant(&self, id: i64) -> bool {
        self.recursive_children_ids.contains(&id)
    }

    /// Persisted projection of this node; `None` for the root sentinel
    pub fn record(&self) -> Option<CategoryRecord> {
        self.parent_id.map(|parent_id| CategoryRecord {
            id: self.id,
            parent_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            order_index: self.order_index,
        })
    }
}
