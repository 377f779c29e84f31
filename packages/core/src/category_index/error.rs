//! Category Index Error Types
//!
//! Two families of errors live here:
//!
//! - [`CategoryIndexError`]: the snapshot cannot be turned into a tree. These
//!   are fatal for the build call and must abort the request before any write.
//! - [`MoveError`]: a requested relocation would break the tree. These are
//!   ordinary validation outcomes surfaced to the caller.

use thiserror::Error;

/// Structural problems found while building an index from a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryIndexError {
    /// A record points at a parent id that is neither `0` nor present
    #[error("Category {category_id} references missing parent category {parent_id}")]
    DanglingParentReference { category_id: i64, parent_id: i64 },

    /// Following parent ids from a record never reaches the root
    #[error("Category {category_id} is part of a parent cycle")]
    CycleDetected { category_id: i64 },

    /// Two records share an id, or a record uses the reserved root id
    #[error("Category id {category_id} appears more than once or is reserved")]
    DuplicateId { category_id: i64 },
}

impl CategoryIndexError {
    pub fn dangling_parent(category_id: i64, parent_id: i64) -> Self {
        Self::DanglingParentReference {
            category_id,
            parent_id,
        }
    }

    pub fn cycle_detected(category_id: i64) -> Self {
        Self::CycleDetected { category_id }
    }

    pub fn duplicate_id(category_id: i64) -> Self {
        Self::DuplicateId { category_id }
    }
}

/// Reasons a category cannot be moved under a new parent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The category being moved does not exist
    #[error("The category that you want to move with id {category_id} was not found")]
    SourceNotFound { category_id: i64 },

    /// The destination parent does not exist
    #[error("The category with id {parent_id}, where you want to move the item, was not found")]
    DestinationNotFound { parent_id: i64 },

    /// The destination is the category itself or one of its descendants
    #[error("You can not move the category in itself or in one of its children. Trying to move category with id {category_id} to the category with id {parent_id}")]
    WithinOwnSubtree { category_id: i64, parent_id: i64 },
}
