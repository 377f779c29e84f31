//! Category Tree Index
//!
//! In-memory hierarchy built from the flat `categories` snapshot:
//!
//! - [`CategoryIndex`] - arena of [`CategoryNode`]s with id and slug lookups,
//!   per-node child/descendant aggregates and depth
//! - [`CategoryTree`] - nested projection for listing and move pickers
//! - move/delete validation run before any write
//!
//! The index is a plain value: build it from a fresh snapshot, query it, drop
//! it. Nothing here touches the database.

mod error;
mod index;
mod node;
mod tree;
mod validation;

pub use error::{CategoryIndexError, MoveError};
pub use index::CategoryIndex;
pub use node::CategoryNode;
pub use tree::CategoryTree;
