//! Category Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/categories?exceptCategoryId=` - Nested tree plus `totalCount`
//! - `GET /api/categories/exports?export_format=csv|pdf` - Download all categories
//! - `POST /api/categories` - Create a category
//! - `GET /api/categories/:id` - `{ id, name, slug }` of one category
//! - `PUT /api/categories/:id` - Update (and possibly move) a category
//! - `DELETE /api/categories/:id` - Delete a category and its descendants
//! - `DELETE /api/categories?ids=[1,2]` - Batch delete with descendants
//!
//! Writes hold `AppState::write_lock` so this process never interleaves two
//! validate-then-write sequences.
//!
//! Extractor rejections never reach axum's plain-text responses: bodies are
//! read as JSON values and checked field by field, and a non-numeric `:id`
//! is a 404 like any other unknown category.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{ApiResponse, AppState, HttpError};
use linkdir_core::models::{CategoryInput, CategorySummary};
use linkdir_core::services::{CategoryServiceError, ExportFormat};
use linkdir_core::{CategoryTree, ValidationErrors};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Raw value; empty or non-numeric means no exclusion
    #[serde(rename = "exceptCategoryId")]
    except_category_id: Option<String>,
}

impl ListQuery {
    fn except_category_id(&self) -> Option<i64> {
        self.except_category_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    export_format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteQuery {
    /// JSON array, e.g. `[1,2,"3"]`
    ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedCategory {
    pub id: i64,
}

/// Full tree, or the tree without one category's subtree
///
/// ```bash
/// curl "http://localhost:3001/api/categories?exceptCategoryId=4"
/// ```
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<CategoryTree>, HttpError> {
    let listing = state
        .category_service
        .list_tree(query.except_category_id())
        .await?;

    Ok(ApiResponse::ok(listing.tree).total_count(listing.total_count))
}

/// Export every category as an attachment
///
/// `export_format` is required.
///
/// ```bash
/// curl -OJ "http://localhost:3001/api/categories/exports?export_format=csv"
/// ```
async fn export_categories(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, HttpError> {
    let format = match query.export_format.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(CategoryServiceError::field(
                "export_format",
                "The export format field is required.",
            )
            .into())
        }
        Some(raw) => raw.parse::<ExportFormat>()?,
    };

    let file = state.category_service.export(format).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}

/// Create a category
///
/// ```bash
/// curl -X POST http://localhost:3001/api/categories \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Rust", "slug": "rust", "parent_id": 0}'
/// ```
async fn create_category(
    State(state): State<AppState>,
    body: Result<axum::Json<Value>, JsonRejection>,
) -> Result<ApiResponse<CreatedCategory>, HttpError> {
    let input = category_input(body)?;
    let _guard = state.write_lock.lock().await;

    let created = state.category_service.create_category(input).await?;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        CreatedCategory { id: created.id },
    ))
}

async fn get_category(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<CategorySummary>, HttpError> {
    let id = category_id(id)?;
    let category = state.category_service.get_category(id).await?;
    Ok(ApiResponse::ok(category.summary()))
}

/// Update a category; a changed `parent_id` moves it
///
/// ```bash
/// curl -X PUT http://localhost:3001/api/categories/7 \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Rust", "slug": "rust", "parent_id": 3}'
/// ```
async fn update_category(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<axum::Json<Value>, JsonRejection>,
) -> Result<ApiResponse<CategorySummary>, HttpError> {
    let id = category_id(id)?;
    let input = category_input(body)?;
    let _guard = state.write_lock.lock().await;

    let updated = state.category_service.update_category(id, input).await?;
    Ok(ApiResponse::ok(updated.summary()))
}

async fn delete_category(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let id = category_id(id)?;
    let _guard = state.write_lock.lock().await;

    state.category_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several categories at once
///
/// ```bash
/// curl -X DELETE "http://localhost:3001/api/categories?ids=%5B3%2C9%5D"
/// ```
async fn delete_categories(
    State(state): State<AppState>,
    Query(query): Query<BatchDeleteQuery>,
) -> Result<StatusCode, HttpError> {
    let ids = match query.ids.as_deref() {
        Some(raw) => parse_id_list(raw)?,
        None => Vec::new(),
    };

    let _guard = state.write_lock.lock().await;

    state.category_service.delete_categories(&ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse a JSON array of ids; entries may be numbers or numeric strings
///
/// Sign is not checked here; the service rejects non-positive ids.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, HttpError> {
    let invalid = || HttpError::new("The ids must be a JSON array of integers.", "INVALID_INPUT");

    let values: Vec<Value> = serde_json::from_str(raw).map_err(|_| invalid())?;

    values
        .iter()
        .map(integer_value)
        .collect::<Option<Vec<i64>>>()
        .ok_or_else(invalid)
}

/// An integer given as a JSON number or a numeric string
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// `:id` segment; anything that is not an integer names no category
fn category_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, HttpError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(HttpError::with_details(
            "Category not found",
            "CATEGORY_NOT_FOUND",
            rejection.body_text(),
        )),
    }
}

/// Read a create/update body into [`CategoryInput`]
///
/// Text fields must be strings; `parent_id` may be a number or a numeric
/// string. A field of the wrong type is reported under its own name, an
/// unreadable body under `body`. Missing fields are left for
/// [`CategoryInput::validate_fields`].
fn category_input(
    body: Result<axum::Json<Value>, JsonRejection>,
) -> Result<CategoryInput, HttpError> {
    let mut errors = ValidationErrors::default();

    let fields = match body {
        Ok(axum::Json(Value::Object(fields))) => fields,
        Ok(_) => {
            errors.add("body", "The request body must be a JSON object.");
            return Err(HttpError::validation(errors));
        }
        Err(rejection) => {
            errors.add("body", rejection.body_text());
            return Err(HttpError::validation(errors));
        }
    };

    let input = CategoryInput {
        name: text_field(&fields, "name", &mut errors),
        slug: text_field(&fields, "slug", &mut errors),
        parent_id: parent_id_field(&fields, &mut errors),
        title: text_field(&fields, "title", &mut errors),
        content: text_field(&fields, "content", &mut errors),
    };

    errors.into_result().map_err(HttpError::validation)?;
    Ok(input)
}

fn text_field(
    fields: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            errors.add(field, format!("The {} must be a string.", field));
            None
        }
    }
}

fn parent_id_field(fields: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<i64> {
    match fields.get("parent_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(value) => {
            let parent_id = integer_value(value);
            if parent_id.is_none() {
                errors.add("parent_id", "The parent id must be a number.");
            }
            parent_id
        }
    }
}

/// Create router with the category endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(list_categories)
                .post(create_category)
                .delete(delete_categories),
        )
        .route("/api/categories/exports", get(export_categories))
        .route(
            "/api/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .with_state(state)
}
