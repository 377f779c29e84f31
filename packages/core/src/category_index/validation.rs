//! Move and delete checks run against a built index before any write

use super::error::MoveError;
use super::index::CategoryIndex;
use crate::models::ROOT_CATEGORY_ID;
use std::collections::BTreeSet;

impl CategoryIndex {
    /// Check that `category_id` may be re-parented under `new_parent_id`.
    ///
    /// Moving to the top level (`0`) or to the current parent is always
    /// allowed. Otherwise the destination must not be the category itself
    /// or anything below it.
    pub fn validate_move(&self, category_id: i64, new_parent_id: i64) -> Result<(), MoveError> {
        let node = self
            .get_by_id(category_id)
            .ok_or(MoveError::SourceNotFound { category_id })?;

        if new_parent_id != ROOT_CATEGORY_ID && !self.contains(new_parent_id) {
            return Err(MoveError::DestinationNotFound {
                parent_id: new_parent_id,
            });
        }

        if new_parent_id == ROOT_CATEGORY_ID || node.parent_id == Some(new_parent_id) {
            return Ok(());
        }

        if new_parent_id == category_id || node.has_descendant(new_parent_id) {
            return Err(MoveError::WithinOwnSubtree {
                category_id,
                parent_id: new_parent_id,
            });
        }

        Ok(())
    }

    /// Every descendant of the given ids, de-duplicated.
    ///
    /// Unknown ids contribute nothing. The requested ids themselves are not
    /// added, so callers delete `ids ∪ result`.
    pub fn collect_deletion_set<I>(&self, ids: I) -> BTreeSet<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        ids.into_iter()
            .filter_map(|id| self.get_by_id(id))
            .flat_map(|node| node.recursive_children_ids.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRecord;

    fn index() -> CategoryIndex {
        // 1 -> 2 -> 3, 4 at top level
        CategoryIndex::build(vec![
            CategoryRecord::new(1, 0, "A", "a", 1),
            CategoryRecord::new(2, 1, "B", "b", 1),
            CategoryRecord::new(3, 2, "C", "c", 1),
            CategoryRecord::new(4, 0, "D", "d", 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        assert_eq!(
            index().validate_move(1, 3),
            Err(MoveError::WithinOwnSubtree {
                category_id: 1,
                parent_id: 3
            })
        );
    }

    #[test]
    fn test_move_into_self_rejected() {
        assert!(matches!(
            index().validate_move(2, 2),
            Err(MoveError::WithinOwnSubtree { .. })
        ));
    }

    #[test]
    fn test_move_descendant_up_allowed() {
        let index = index();
        assert_eq!(index.validate_move(3, 1), Ok(()));
        assert_eq!(index.validate_move(3, 4), Ok(()));
    }

    #[test]
    fn test_noop_and_top_level_moves_allowed() {
        let index = index();
        assert_eq!(index.validate_move(2, 1), Ok(()));
        assert_eq!(index.validate_move(1, 0), Ok(()));
        assert_eq!(index.validate_move(3, 0), Ok(()));
    }

    #[test]
    fn test_missing_source_and_destination() {
        let index = index();
        assert_eq!(
            index.validate_move(9, 1),
            Err(MoveError::SourceNotFound { category_id: 9 })
        );
        assert_eq!(
            index.validate_move(0, 1),
            Err(MoveError::SourceNotFound { category_id: 0 })
        );
        assert_eq!(
            index.validate_move(2, 9),
            Err(MoveError::DestinationNotFound { parent_id: 9 })
        );
    }

    #[test]
    fn test_deletion_set() {
        let index = index();
        assert_eq!(
            index.collect_deletion_set([1]),
            BTreeSet::from([2, 3])
        );
        assert_eq!(
            index.collect_deletion_set([1, 2, 99]),
            BTreeSet::from([2, 3])
        );
        assert!(index.collect_deletion_set([4, 99]).is_empty());
    }
}
