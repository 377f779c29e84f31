//! Arena-backed category tree built from a flat parent-pointer snapshot

use super::error::CategoryIndexError;
use super::node::CategoryNode;
use super::tree::CategoryTree;
use crate::models::{CategoryRecord, ROOT_CATEGORY_ID};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Slot of the root sentinel in the arena
const ROOT_SLOT: usize = 0;

/// Read-only hierarchical index over one snapshot of the `categories` table.
///
/// Built fresh per request with [`CategoryIndex::build`] and dropped when the
/// request ends. There is no mutation API: after a write, rebuild from a new
/// snapshot.
///
/// # Examples
///
/// ```rust
/// use linkdir_core::category_index::CategoryIndex;
/// use linkdir_core::models::CategoryRecord;
///
/// let index = CategoryIndex::build(vec![
///     CategoryRecord::new(1, 0, "Programming", "programming", 1),
///     CategoryRecord::new(2, 1, "Rust", "rust", 1),
/// ])
/// .unwrap();
///
/// assert_eq!(index.root().recursive_children_count, 2);
/// assert_eq!(index.get_by_slug("rust").map(|n| n.level), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    nodes: Vec<CategoryNode>,
    by_id: HashMap<i64, usize>,
    by_slug: HashMap<String, usize>,
}

impl CategoryIndex {
    /// Build the index from records in any order.
    ///
    /// Fails on the first record whose parent is missing, on a duplicate or
    /// reserved id, and on parent cycles. A failed build leaves nothing
    /// behind, so callers must abort before writing.
    pub fn build<I>(records: I) -> Result<Self, CategoryIndexError>
    where
        I: IntoIterator<Item = CategoryRecord>,
    {
        let mut index = Self {
            nodes: vec![CategoryNode::root()],
            by_id: HashMap::new(),
            by_slug: HashMap::new(),
        };

        for record in records {
            if record.id == ROOT_CATEGORY_ID || index.by_id.contains_key(&record.id) {
                return Err(CategoryIndexError::duplicate_id(record.id));
            }
            let slot = index.nodes.len();
            index.by_id.insert(record.id, slot);
            index.by_slug.entry(record.slug.clone()).or_insert(slot);
            index.nodes.push(CategoryNode::from_record(record));
        }

        for slot in 1..index.nodes.len() {
            index.link(slot)?;
        }
        index.assign_levels();

        debug!(
            "Built category index: {} categories, {} top-level",
            index.len(),
            index.nodes[ROOT_SLOT].children_count
        );

        Ok(index)
    }

    /// Attach the node at `slot` to its parent and register it on every
    /// ancestor up to and including the root.
    fn link(&mut self, slot: usize) -> Result<(), CategoryIndexError> {
        let id = self.nodes[slot].id;
        let parent_slot = self.parent_slot(slot)?;

        let parent = &mut self.nodes[parent_slot];
        parent.children.push(id);
        parent.children_ids.push(id);
        parent.children_count += 1;

        // A valid chain visits each node at most once before the root.
        let bound = self.nodes.len();
        let mut steps = 0;
        let mut current = Some(parent_slot);
        while let Some(ancestor) = current {
            if ancestor == slot || steps > bound {
                return Err(CategoryIndexError::cycle_detected(id));
            }
            let node = &mut self.nodes[ancestor];
            node.recursive_children_ids.push(id);
            node.recursive_children_count += 1;

            current = if ancestor == ROOT_SLOT {
                None
            } else {
                Some(self.parent_slot(ancestor)?)
            };
            steps += 1;
        }

        Ok(())
    }

    fn parent_slot(&self, slot: usize) -> Result<usize, CategoryIndexError> {
        let node = &self.nodes[slot];
        match node.parent_id {
            None | Some(ROOT_CATEGORY_ID) => Ok(ROOT_SLOT),
            Some(parent_id) => self
                .by_id
                .get(&parent_id)
                .copied()
                .ok_or_else(|| CategoryIndexError::dangling_parent(node.id, parent_id)),
        }
    }

    fn assign_levels(&mut self) {
        let mut queue = VecDeque::from([ROOT_SLOT]);
        while let Some(slot) = queue.pop_front() {
            let level = self.nodes[slot].level + 1;
            let child_slots: Vec<usize> = self.nodes[slot]
                .children
                .iter()
                .filter_map(|id| self.by_id.get(id).copied())
                .collect();
            for child in child_slots {
                self.nodes[child].level = level;
                queue.push_back(child);
            }
        }
    }

    /// Node lookup that also resolves `0` to the root sentinel
    fn node(&self, id: i64) -> Option<&CategoryNode> {
        if id == ROOT_CATEGORY_ID {
            Some(&self.nodes[ROOT_SLOT])
        } else {
            self.by_id.get(&id).map(|&slot| &self.nodes[slot])
        }
    }

    /// The synthetic root every top-level category hangs from
    pub fn root(&self) -> &CategoryNode {
        &self.nodes[ROOT_SLOT]
    }

    /// Number of categories, not counting the root sentinel
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All categories in snapshot order
    pub fn categories(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes.iter().skip(1)
    }

    /// Category by id. The root sentinel is never returned.
    pub fn get_by_id(&self, id: i64) -> Option<&CategoryNode> {
        self.by_id.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&CategoryNode> {
        self.by_slug.get(slug).map(|&slot| &self.nodes[slot])
    }

    /// Direct children of `id` (`0` for top-level categories).
    ///
    /// `None` when the id is unknown or the node has no children.
    pub fn direct_children(&self, id: i64) -> Option<Vec<&CategoryNode>> {
        let node = self.node(id)?;
        if node.is_leaf() {
            return None;
        }
        Some(
            node.children
                .iter()
                .filter_map(|child| self.get_by_id(*child))
                .collect(),
        )
    }

    /// The node itself followed by each ancestor up to its top-level ancestor.
    ///
    /// The root sentinel only appears when asking for `0` directly.
    pub fn ancestor_chain(&self, id: i64) -> Vec<&CategoryNode> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.node(id);

        while let Some(node) = current {
            if !visited.insert(node.id) {
                break;
            }
            chain.push(node);
            current = match node.parent_id {
                None | Some(ROOT_CATEGORY_ID) => None,
                Some(parent_id) => self.get_by_id(parent_id),
            };
        }

        chain
    }

    /// First node on the ancestor chain of `id` sitting at `level`
    pub fn ancestor_at_level(&self, id: i64, level: u32) -> Option<&CategoryNode> {
        self.ancestor_chain(id)
            .into_iter()
            .find(|node| node.level == level)
    }

    /// `id` followed by all of its descendants; empty for unknown ids.
    ///
    /// For the root this is every category id.
    pub fn subtree_ids(&self, id: i64) -> Vec<i64> {
        match self.node(id) {
            None => Vec::new(),
            Some(node) if node.is_root() => node.recursive_children_ids.clone(),
            Some(node) => std::iter::once(node.id)
                .chain(node.recursive_children_ids.iter().copied())
                .collect(),
        }
    }

    /// Order index for a new last child of `parent_id`
    pub fn next_order_index(&self, parent_id: i64) -> i64 {
        self.node(parent_id)
            .and_then(|parent| {
                parent
                    .children
                    .iter()
                    .filter_map(|child| self.get_by_id(*child))
                    .map(|child| child.order_index)
                    .max()
            })
            .map_or(1, |max| max + 1)
    }

    /// Nested tree of every category under the root sentinel
    pub fn tree(&self) -> CategoryTree {
        self.subtree(ROOT_SLOT, None)
    }

    /// Nested tree without `excluded_id` and everything below it.
    ///
    /// Used to offer valid destinations when moving `excluded_id`. `0` or an
    /// unknown id yields the full tree.
    pub fn tree_excluding(&self, excluded_id: i64) -> CategoryTree {
        let excluded = (excluded_id != ROOT_CATEGORY_ID).then_some(excluded_id);
        self.subtree(ROOT_SLOT, excluded)
    }

    /// [`tree_excluding`](Self::tree_excluding) addressed by slug
    pub fn tree_excluding_slug(&self, slug: &str) -> CategoryTree {
        match self.get_by_slug(slug) {
            Some(node) => self.tree_excluding(node.id),
            None => self.tree(),
        }
    }

    /// Nested tree under `slot`, assembled bottom-up from an explicit stack
    /// so chain depth never touches the call stack.
    fn subtree(&self, slot: usize, excluded: Option<i64>) -> CategoryTree {
        // (slot, position of the next child to visit, finished children)
        let mut stack: Vec<(usize, usize, Vec<CategoryTree>)> = vec![(slot, 0, Vec::new())];
        let mut finished = None;

        while let Some((top, next, children)) = stack.last_mut() {
            let node = &self.nodes[*top];

            if let Some(&child_id) = node.children.get(*next) {
                *next += 1;
                if Some(child_id) != excluded {
                    if let Some(&child_slot) = self.by_id.get(&child_id) {
                        stack.push((child_slot, 0, Vec::new()));
                    }
                }
                continue;
            }

            let tree = tree_node(node, std::mem::take(children));
            stack.pop();
            match stack.last_mut() {
                Some((_, _, siblings)) => siblings.push(tree),
                None => finished = Some(tree),
            }
        }

        finished.unwrap_or_else(|| tree_node(&self.nodes[slot], Vec::new()))
    }
}

fn tree_node(node: &CategoryNode, children: Vec<CategoryTree>) -> CategoryTree {
    CategoryTree {
        id: node.id,
        parent_id: node.parent_id,
        name: node.name.clone(),
        slug: node.slug.clone(),
        order_index: node.order_index,
        children,
    }
}
