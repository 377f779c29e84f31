//! Service Layer Error Types
//!
//! Errors for category operations. Field-level problems travel as
//! [`ValidationErrors`] so the caller can report each failed rule.

use crate::category_index::CategoryIndexError;
use crate::models::ValidationErrors;
use thiserror::Error;

/// Category service errors
#[derive(Error, Debug)]
pub enum CategoryServiceError {
    /// Category not found by id
    #[error("Category not found: {id}")]
    NotFound { id: i64 },

    /// One or more request fields failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Batch id list missing, malformed or containing non-positive ids
    #[error("Invalid id list: {0}")]
    InvalidIds(String),

    /// The stored rows do not form a tree
    #[error("Category tree is inconsistent: {0}")]
    Index(#[from] CategoryIndexError),

    /// Store read or write failed
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Export format recognised but not produced by this service
    #[error("Export format not supported: {0}")]
    UnsupportedExportFormat(String),

    /// Rendering the export body failed
    #[error("Export failed: {0}")]
    Export(String),
}

impl CategoryServiceError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create an invalid ids error
    pub fn invalid_ids(msg: impl Into<String>) -> Self {
        Self::InvalidIds(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an unsupported export format error
    pub fn unsupported_export_format(format: impl Into<String>) -> Self {
        Self::UnsupportedExportFormat(format.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// A single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        Self::Validation(errors)
    }
}
