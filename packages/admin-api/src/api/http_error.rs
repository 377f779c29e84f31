//! HTTP error handling
//!
//! Every failure leaves the API as `{ status, message, code, details?, errors? }`
//! with the HTTP status derived from `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use linkdir_core::services::CategoryServiceError;
use linkdir_core::ValidationErrors;
use serde::{Deserialize, Serialize};

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: u16,
    #[serde(flatten)]
    error: &'a HttpError,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
            errors: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(message, code)
        }
    }

    /// A 400 carrying per-field messages
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new("The given data was invalid.", "VALIDATION_ERROR")
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "CATEGORY_NOT_FOUND" | "RESOURCE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_INPUT" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "NOT_IMPLEMENTED" => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            status: status.as_u16(),
            error: &self,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CategoryServiceError> for HttpError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::NotFound { id } => HttpError::new(
                format!("Category not found: {}", id),
                "CATEGORY_NOT_FOUND",
            ),
            CategoryServiceError::Validation(errors) => HttpError::validation(errors),
            CategoryServiceError::InvalidIds(message) => HttpError::new(message, "INVALID_INPUT"),
            CategoryServiceError::UnsupportedExportFormat(format) => HttpError::new(
                format!("Export format '{}' is not available", format),
                "NOT_IMPLEMENTED",
            ),
            CategoryServiceError::Index(index_err) => {
                tracing::error!("Category tree is inconsistent: {}", index_err);
                HttpError::with_details(
                    "The category tree is inconsistent",
                    "CATEGORY_TREE_CORRUPT",
                    index_err.to_string(),
                )
            }
            CategoryServiceError::Store(message) => {
                tracing::error!("Category store failure: {}", message);
                HttpError::new(message, "DATABASE_ERROR")
            }
            CategoryServiceError::Export(message) => HttpError::new(message, "EXPORT_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkdir_core::category_index::CategoryIndexError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CategoryServiceError::not_found(1), StatusCode::NOT_FOUND),
            (
                CategoryServiceError::invalid_ids("empty"),
                StatusCode::BAD_REQUEST,
            ),
            (
                CategoryServiceError::field("name", "taken"),
                StatusCode::BAD_REQUEST,
            ),
            (
                CategoryServiceError::unsupported_export_format("pdf"),
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                CategoryServiceError::Index(CategoryIndexError::cycle_detected(4)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CategoryServiceError::store("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_validation_body_carries_field_errors() {
        let http_err = HttpError::from(CategoryServiceError::field("slug", "taken"));
        let body = serde_json::to_value(ErrorEnvelope {
            status: 400,
            error: &http_err,
        })
        .unwrap();

        assert_eq!(body["status"], 400);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["slug"][0], "taken");
        assert!(body.get("details").is_none());
    }
}
