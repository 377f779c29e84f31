//! Category Data Structures
//!
//! This module defines the persisted category row and the request/update
//! payloads that flow between the HTTP layer, the services and the store.
//!
//! # Architecture
//!
//! - **Flat parent-pointer table**: every category stores `parent_id`, with `0`
//!   meaning "top level" (never NULL)
//! - **Sibling ordering**: `order_index` orders categories under the same parent
//! - **Unique identity**: `id`, `name` and `slug` are unique across the table
//!
//! # Examples
//!
//! ```rust
//! use linkdir_core::models::{CategoryInput, ROOT_CATEGORY_ID};
//!
//! let input = CategoryInput {
//!     name: Some("Rust".to_string()),
//!     slug: Some("rust".to_string()),
//!     parent_id: Some(ROOT_CATEGORY_ID),
//!     ..Default::default()
//! };
//! assert!(input.validate_fields().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parent id used by top-level categories; also the id of the root sentinel.
pub const ROOT_CATEGORY_ID: i64 = 0;

/// Maximum length accepted for `name` and `slug`.
pub const MAX_FIELD_LENGTH: usize = 255;

/// The projection of a category row the tree engine works with.
///
/// Snapshot queries return these ordered by `(parent_id, order_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub parent_id: i64,
    pub name: String,
    pub slug: String,
    pub order_index: i64,
}

impl CategoryRecord {
    pub fn new(
        id: i64,
        parent_id: i64,
        name: impl Into<String>,
        slug: impl Into<String>,
        order_index: i64,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            slug: slug.into(),
            order_index,
        }
    }
}

/// Full category row as stored in the `categories` table.
///
/// `title` and `content` are free-form SEO text edited from the admin form;
/// they play no part in tree logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub parent_id: i64,
    pub name: String,
    pub slug: String,
    pub order_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Category {
    /// Tree-relevant projection of this row
    pub fn record(&self) -> CategoryRecord {
        CategoryRecord {
            id: self.id,
            parent_id: self.parent_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            order_index: self.order_index,
        }
    }

    /// The `{ id, name, slug }` projection returned by the single-item endpoint
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Compact projection of a category used for "get for edit" responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Row to insert; `order_index` is computed by the caller from the tree index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub parent_id: i64,
    pub name: String,
    pub slug: String,
    pub order_index: i64,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Sparse update: `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub parent_id: Option<i64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub order_index: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Create/update request payload as submitted by the admin UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl CategoryInput {
    /// Check the per-field rules that do not need the store:
    /// `name`/`slug` required and at most [`MAX_FIELD_LENGTH`] characters,
    /// `parent_id` required and not negative (`0` for top level).
    pub fn validate_fields(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        check_text_field(&mut errors, "name", self.name.as_deref());
        check_text_field(&mut errors, "slug", self.slug.as_deref());

        match self.parent_id {
            None => errors.add("parent_id", "The parent id field is required."),
            Some(parent_id) if parent_id < 0 => errors.add(
                "parent_id",
                "The parent id must be a positive number or 0.",
            ),
            Some(_) => {}
        }

        errors
    }
}

fn check_text_field(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    match value.map(str::trim) {
        None | Some("") => errors.add(field, format!("The {} field is required.", field)),
        Some(text) if text.chars().count() > MAX_FIELD_LENGTH => errors.add(
            field,
            format!(
                "The {} must not be greater than {} characters.",
                field, MAX_FIELD_LENGTH
            ),
        ),
        Some(_) => {}
    }
}

/// Field-keyed validation failures, e.g. `{"name": ["The name has already been taken."]}`
///
/// Every failed rule is kept so the caller can report exactly which one failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, empty if the field passed
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self
            .fields
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> CategoryInput {
        CategoryInput {
            name: Some("Databases".to_string()),
            slug: Some("databases".to_string()),
            parent_id: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_has_no_errors() {
        assert!(valid_input().validate_fields().is_empty());
    }

    #[test]
    fn test_missing_name_and_blank_slug_are_reported_per_field() {
        let input = CategoryInput {
            name: None,
            slug: Some("   ".to_string()),
            ..valid_input()
        };

        let errors = input.validate_fields();
        assert_eq!(errors.get("name"), ["The name field is required."]);
        assert_eq!(errors.get("slug"), ["The slug field is required."]);
        assert!(!errors.has("parent_id"));
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let input = CategoryInput {
            name: Some("x".repeat(MAX_FIELD_LENGTH + 1)),
            ..valid_input()
        };

        let errors = input.validate_fields();
        assert_eq!(
            errors.get("name"),
            ["The name must not be greater than 255 characters."]
        );
    }

    #[test]
    fn test_negative_parent_is_rejected() {
        let input = CategoryInput {
            parent_id: Some(-4),
            ..valid_input()
        };

        assert!(input.validate_fields().has("parent_id"));
    }

    #[test]
    fn test_missing_parent_is_required() {
        let input = CategoryInput {
            parent_id: None,
            ..valid_input()
        };
        assert_eq!(
            input.validate_fields().get("parent_id"),
            ["The parent id field is required."]
        );

        let top_level = CategoryInput {
            parent_id: Some(ROOT_CATEGORY_ID),
            ..valid_input()
        };
        assert!(top_level.validate_fields().is_empty());
    }

    #[test]
    fn test_validation_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "The name has already been taken.");
        errors.add("parent_id", "first");
        errors.add("parent_id", "second");

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!({
                "name": ["The name has already been taken."],
                "parent_id": ["first", "second"]
            })
        );
        assert_eq!(
            errors.to_string(),
            "The name has already been taken. first second"
        );
    }

    #[test]
    fn test_input_deserializes_with_missing_fields() {
        let input: CategoryInput = serde_json::from_value(json!({ "name": "Go" })).unwrap();
        assert_eq!(input.name.as_deref(), Some("Go"));
        assert!(input.slug.is_none());
        assert!(input.parent_id.is_none());
    }
}
