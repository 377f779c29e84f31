//! Category API Integration Tests
//!
//! Drives the full router (`create_router`) with in-process requests against
//! a temporary database and checks status codes and response envelopes.

#[cfg(test)]
mod category_api_tests {
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use linkdir_admin_api::{create_router, AppState};
    use linkdir_core::db::{CategoryStore, DatabaseService, TursoStore};
    use linkdir_core::services::CategoryService;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn create_test_app() -> Result<(Router, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        let store: Arc<dyn CategoryStore> = Arc::new(TursoStore::new(db));
        let state = AppState::new(CategoryService::new(store));
        Ok((create_router(state, &[]), temp_dir))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = send_raw(app, method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        match body {
            Some(value) => send_raw_body(app, method, uri, Body::from(value.to_string())).await,
            None => {
                let request = Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap();
                dispatch(app, request).await
            }
        }
    }

    /// Send `body` as `application/json` without checking that it parses
    async fn send_raw_body(
        app: &Router,
        method: Method,
        uri: &str,
        body: Body,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        dispatch(app, request).await
    }

    async fn dispatch(
        app: &Router,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    async fn create(app: &Router, name: &str, parent_id: i64) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/categories",
            Some(json!({
                "name": name,
                "slug": name.to_lowercase(),
                "parent_id": parent_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create {} failed: {}", name, body);
        assert_eq!(body["status"], 201);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;

        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        Ok(())
    }

    #[tokio::test]
    async fn test_list_returns_tree_and_total_count() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let news = create(&app, "News", 0).await;
        let tech = create(&app, "Tech", news).await;
        create(&app, "Sport", 0).await;

        let (status, body) = send(&app, Method::GET, "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["totalCount"], 3);
        assert_eq!(body["data"]["id"], 0);
        assert_eq!(body["data"]["parent_id"], Value::Null);
        assert_eq!(body["data"]["children"][0]["children"][0]["id"], tech);

        let uri = format!("/api/categories?exceptCategoryId={}", news);
        let (_, pruned) = send(&app, Method::GET, &uri, None).await;
        let top = pruned["data"]["children"].as_array().unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0]["name"], "Sport");

        for uri in [
            "/api/categories?exceptCategoryId=",
            "/api/categories?exceptCategoryId=abc",
        ] {
            let (status, full) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(full["data"]["children"].as_array().unwrap().len(), 2);
            assert_eq!(full["totalCount"], 3);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_get_category_projection_and_not_found() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let id = create(&app, "News", 0).await;

        let (status, body) = send(&app, Method::GET, &format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "id": id, "name": "News", "slug": "news" }));

        let (status, body) = send(&app, Method::GET, "/api/categories/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
        assert_eq!(body["code"], "CATEGORY_NOT_FOUND");

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/api/categories/news", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["code"], "CATEGORY_NOT_FOUND");
        }
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/categories/news",
            Some(json!({ "name": "News", "slug": "news", "parent_id": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_validation_errors() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        create(&app, "News", 0).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "News", "parent_id": 77 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["name"][0], "The name has already been taken.");
        assert_eq!(body["errors"]["slug"][0], "The slug field is required.");
        assert_eq!(body["errors"]["parent_id"][0], "The selected parent id is invalid.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "Sport", "slug": "sport" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["parent_id"][0], "The parent id field is required.");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_body_types() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let news = create(&app, "News", 0).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "Tech", "slug": "tech", "parent_id": news.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let tech = body["data"]["id"].as_i64().unwrap();
        let (_, listing) = send(&app, Method::GET, "/api/categories", None).await;
        assert_eq!(listing["data"]["children"][0]["children"][0]["id"], tech);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": 5, "slug": "five", "parent_id": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["name"][0], "The name must be a string.");

        let (status, _, bytes) = send_raw_body(
            &app,
            Method::POST,
            "/api/categories",
            Body::from("{\"name\": "),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["errors"]["body"].is_array());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_moves_and_rejects_cycles() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let a = create(&app, "A", 0).await;
        let b = create(&app, "B", a).await;
        let c = create(&app, "C", 0).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", a),
            Some(json!({ "name": "A", "slug": "a", "parent_id": b })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["errors"]["parent_id"][0].as_str().unwrap();
        assert!(message.starts_with("You can not move the category in itself"));

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", a),
            Some(json!({ "name": "A renamed", "slug": "a", "parent_id": c })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "A renamed");

        let (_, listing) = send(&app, Method::GET, "/api/categories", None).await;
        let top = &listing["data"]["children"][0];
        assert_eq!(top["id"], c);
        assert_eq!(top["children"][0]["id"], a);
        assert_eq!(top["children"][0]["children"][0]["id"], b);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/categories/999",
            Some(json!({ "name": "Ghost", "slug": "ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", b),
            Some(json!({ "name": "B", "slug": "b" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["parent_id"][0], "The parent id field is required.");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let a = create(&app, "A", 0).await;
        let b = create(&app, "B", a).await;

        let (status, body) = send(&app, Method::DELETE, &format!("/api/categories/{}", a), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &format!("/api/categories/{}", b), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/categories/{}", a), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_batch_delete() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let a = create(&app, "A", 0).await;
        create(&app, "A1", a).await;
        let b = create(&app, "B", 0).await;
        let c = create(&app, "C", 0).await;

        // ids=[a,"b"] url-encoded
        let uri = format!("/api/categories?ids=%5B{}%2C%22{}%22%5D", a, b);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listing) = send(&app, Method::GET, "/api/categories", None).await;
        assert_eq!(listing["totalCount"], 1);
        assert_eq!(listing["data"]["children"][0]["id"], c);

        let (status, body) = send(&app, Method::DELETE, "/api/categories", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let (status, _) = send(&app, Method::DELETE, "/api/categories?ids=%5B-1%5D", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::DELETE, "/api/categories?ids=oops", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_export_formats() -> Result<()> {
        let (app, _temp_dir) = create_test_app().await?;
        let a = create(&app, "A", 0).await;

        let (status, headers, bytes) = send_raw(
            &app,
            Method::GET,
            "/api/categories/exports?export_format=csv",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str()?;
        assert!(disposition.starts_with("attachment; filename=\"categories-"));
        assert_eq!(
            String::from_utf8(bytes)?,
            format!("Id,Parent,Name,Order\n{},0,A,1\n", a)
        );

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/categories/exports?export_format=pdf",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["code"], "NOT_IMPLEMENTED");

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/categories/exports?export_format=xml",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["export_format"].is_array());

        let (status, body) = send(&app, Method::GET, "/api/categories/exports", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"]["export_format"][0],
            "The export format field is required."
        );

        Ok(())
    }
}
