//! Nested tree projection handed to the HTTP layer
//!
//! Serializes as `{ id, parent_id, name, slug, order_index, children: [...] }`,
//! with the root sentinel carrying `parent_id: null`.

use serde::{Deserialize, Serialize};

/// One node of a nested category tree, owning its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub order_index: i64,
    pub children: Vec<CategoryTree>,
}

impl CategoryTree {
    /// True when `id` is this node or appears anywhere below it
    pub fn contains(&self, id: i64) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return true;
            }
            stack.extend(node.children.iter());
        }
        false
    }

    /// Ids below this node in depth-first pre-order, excluding this node
    pub fn descendant_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack: Vec<&CategoryTree> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        ids
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&CategoryTree> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Unlink children before they drop so a deep chain is freed in a loop.
impl Drop for CategoryTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
