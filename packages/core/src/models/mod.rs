//! Data Models
//!
//! This module contains the category data structures shared by the tree
//! engine, the persistence layer and the services:
//!
//! - `CategoryRecord` - the five-column projection the tree is built from
//! - `Category` - the full persisted row
//! - `CategoryInput`, `NewCategory`, `CategoryUpdate` - request and write payloads

mod category;

pub use category::{
    Category, CategoryInput, CategoryRecord, CategorySummary, CategoryUpdate, NewCategory,
    ValidationErrors, MAX_FIELD_LENGTH, ROOT_CATEGORY_ID,
};
