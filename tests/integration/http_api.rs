//! Integration tests for the todo REST API.
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`, once
//! over the in-memory store and once over an in-memory `SQLite` database, so
//! both stores are held to the same HTTP contract.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::too_many_lines)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use todo_server::handlers::AppState;
use todo_server::server::router;
use todo_proto::{NewTodo, Todo, TodoChanges, TodoId};
use todo_server::store::{MemoryStore, SqliteStore, StoreError, TodoStore};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// One router per store implementation, each over an empty store.
async fn routers() -> Vec<(&'static str, Router)> {
    let sqlite = SqliteStore::in_memory().await.expect("open sqlite");
    vec![
        ("memory", router(Arc::new(AppState::new(MemoryStore::new())))),
        ("sqlite", router(Arc::new(AppState::new(sqlite)))),
    ]
}

/// Store whose every call fails, for the 500 paths.
struct FailingStore;

fn disk_failure() -> StoreError {
    StoreError::Corrupt("disk unavailable".into())
}

impl TodoStore for FailingStore {
    async fn list(&self, _keyword: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        Err(disk_failure())
    }

    async fn get(&self, _id: TodoId) -> Result<Option<Todo>, StoreError> {
        Err(disk_failure())
    }

    async fn insert(&self, _new: NewTodo) -> Result<Todo, StoreError> {
        Err(disk_failure())
    }

    async fn update(&self, _id: TodoId, _changes: &TodoChanges) -> Result<Todo, StoreError> {
        Err(disk_failure())
    }

    async fn delete(&self, _id: TodoId) -> Result<(), StoreError> {
        Err(disk_failure())
    }
}

/// Sends a request and returns the status and the decoded JSON body.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body).unwrap()).await
}

/// Sends a prepared request and returns the status and decoded JSON body.
async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, value)
}

/// Creates a todo and returns its JSON.
async fn create(app: &Router, body: Value) -> Value {
    let (status, todo) = send(app, Method::POST, "/todos", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {todo}");
    todo
}

fn id_of(todo: &Value) -> i64 {
    todo["id"].as_i64().expect("numeric id")
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_applies_defaults() {
    for (name, app) in routers().await {
        let todo = create(&app, json!({"title": "Buy milk"})).await;

        assert!(id_of(&todo) > 0, "[{name}]");
        assert_eq!(todo["title"], "Buy milk", "[{name}]");
        assert_eq!(todo["completed"], false, "[{name}]");
        assert_eq!(todo["priority"], "MEDIUM", "[{name}]");
        assert!(todo["description"].is_null(), "[{name}]");
        assert!(todo["dueDate"].is_null(), "[{name}]");
        assert_eq!(todo["createdAt"], todo["updatedAt"], "[{name}]");
    }
}

#[tokio::test]
async fn create_with_all_fields() {
    for (name, app) in routers().await {
        let todo = create(
            &app,
            json!({
                "title": "Pay rent",
                "description": "before the 5th",
                "dueDate": "2026-01-21",
                "priority": "HIGH"
            }),
        )
        .await;

        assert_eq!(todo["description"], "before the 5th", "[{name}]");
        assert_eq!(todo["dueDate"], "2026-01-21T00:00:00.000Z", "[{name}]");
        assert_eq!(todo["priority"], "HIGH", "[{name}]");
    }
}

#[tokio::test]
async fn create_without_title_is_rejected() {
    for (name, app) in routers().await {
        for body in [json!({}), json!({"title": ""}), json!({"title": null})] {
            let (status, error) = send(&app, Method::POST, "/todos", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "[{name}]");
            assert_eq!(error["error"], "Title is required", "[{name}]");
            assert_eq!(
                error["details"], "The request body must include a title.",
                "[{name}]"
            );
        }

        let (_, list) = send(&app, Method::GET, "/todos", None).await;
        assert_eq!(list, json!([]), "[{name}] nothing was stored");
    }
}

#[tokio::test]
async fn create_with_invalid_data_is_rejected() {
    for (name, app) in routers().await {
        for body in [
            json!({"title": "x", "dueDate": "not a date"}),
            json!({"title": "x", "priority": "URGENT"}),
            json!({"title": "x", "priority": "high"}),
        ] {
            let (status, error) = send(&app, Method::POST, "/todos", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "[{name}]");
            assert_eq!(error["error"], "Invalid todo data", "[{name}]");
        }

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/todos")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, error) = send_request(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "[{name}]");
        assert_eq!(error["error"], "Invalid todo data", "[{name}]");
    }
}

#[tokio::test]
async fn create_accepts_body_without_content_type() {
    for (name, app) in routers().await {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/todos")
            .body(Body::from(r#"{"title":"plain"}"#))
            .unwrap();
        let (status, todo) = send_request(&app, request).await;
        assert_eq!(status, StatusCode::CREATED, "[{name}]");
        assert_eq!(todo["title"], "plain", "[{name}]");
    }
}

// ---------------------------------------------------------------------------
// List and search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_newest_first() {
    for (name, app) in routers().await {
        let first = create(&app, json!({"title": "first"})).await;
        let second = create(&app, json!({"title": "second"})).await;

        let (status, list) = send(&app, Method::GET, "/todos", None).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        let ids: Vec<i64> = list.as_array().unwrap().iter().map(id_of).collect();
        assert_eq!(ids, [id_of(&second), id_of(&first)], "[{name}]");
    }
}

#[tokio::test]
async fn keyword_filters_title_and_description() {
    for (name, app) in routers().await {
        create(&app, json!({"title": "Buy milk"})).await;
        create(&app, json!({"title": "Groceries", "description": "MILK and eggs"})).await;
        create(&app, json!({"title": "Walk dog"})).await;
        create(&app, json!({"title": "Äpfel kaufen"})).await;

        let (status, hits) = send(&app, Method::GET, "/todos?keyword=milk", None).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        let titles: Vec<&str> = hits
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Groceries", "Buy milk"], "[{name}]");

        // "äpfel", percent-encoded.
        let (_, hits) = send(&app, Method::GET, "/todos?keyword=%C3%A4pfel", None).await;
        assert_eq!(hits.as_array().unwrap().len(), 1, "[{name}]");
        assert_eq!(hits[0]["title"], "Äpfel kaufen", "[{name}]");

        let (_, none) = send(&app, Method::GET, "/todos?keyword=zebra", None).await;
        assert_eq!(none, json!([]), "[{name}]");

        let (_, all) = send(&app, Method::GET, "/todos?keyword=", None).await;
        assert_eq!(all.as_array().unwrap().len(), 4, "[{name}]");
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_returns_the_todo() {
    for (name, app) in routers().await {
        let todo = create(&app, json!({"title": "Buy milk"})).await;
        let (status, fetched) =
            send(&app, Method::GET, &format!("/todos/{}", id_of(&todo)), None).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        assert_eq!(fetched, todo, "[{name}]");
    }
}

#[tokio::test]
async fn get_unknown_or_malformed_id_is_not_found() {
    for (name, app) in routers().await {
        let (status, error) = send(&app, Method::GET, "/todos/999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "[{name}]");
        assert_eq!(error["error"], "Todo not found", "[{name}]");
        assert_eq!(error["details"], "No todo exists with id 999999", "[{name}]");

        let (status, _) = send(&app, Method::GET, "/todos/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "[{name}]");
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_changes_only_present_fields() {
    for (name, app) in routers().await {
        let todo = create(
            &app,
            json!({"title": "Buy milk", "description": "2 litres", "priority": "LOW"}),
        )
        .await;
        let uri = format!("/todos/{}", id_of(&todo));

        let (status, updated) =
            send(&app, Method::PUT, &uri, Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        assert_eq!(updated["completed"], true, "[{name}]");
        for field in ["id", "title", "description", "dueDate", "priority", "createdAt"] {
            assert_eq!(updated[field], todo[field], "[{name}] {field} changed");
        }
        assert!(
            updated["updatedAt"].as_str().unwrap() >= todo["updatedAt"].as_str().unwrap(),
            "[{name}]"
        );

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated, "[{name}] update was persisted");
    }
}

#[tokio::test]
async fn update_null_clears_optional_fields() {
    for (name, app) in routers().await {
        let todo = create(
            &app,
            json!({"title": "Pay rent", "description": "soon", "dueDate": "2026-02-01"}),
        )
        .await;
        let uri = format!("/todos/{}", id_of(&todo));

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"description": null, "dueDate": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        assert!(updated["description"].is_null(), "[{name}]");
        assert!(updated["dueDate"].is_null(), "[{name}]");
        assert_eq!(updated["title"], "Pay rent", "[{name}]");
    }
}

#[tokio::test]
async fn update_failures_are_not_found() {
    for (name, app) in routers().await {
        let todo = create(&app, json!({"title": "Buy milk"})).await;
        let uri = format!("/todos/{}", id_of(&todo));

        let cases = [
            ("/todos/999999".to_string(), json!({"completed": true})),
            ("/todos/abc".to_string(), json!({"completed": true})),
            (uri.clone(), json!({"title": ""})),
            (uri.clone(), json!({"title": null})),
            (uri.clone(), json!({"priority": "SOON"})),
            (uri.clone(), json!({"dueDate": "yesterday-ish"})),
        ];
        for (target, body) in cases {
            let (status, error) = send(&app, Method::PUT, &target, Some(body.clone())).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "[{name}] {target} {body}");
            assert_eq!(error["error"], "Update failed", "[{name}]");
            assert_eq!(error["details"], "Todo not found or invalid data", "[{name}]");
        }

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched, todo, "[{name}] rejected updates left the row alone");
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_the_todo_once() {
    for (name, app) in routers().await {
        let todo = create(&app, json!({"title": "Buy milk"})).await;
        let uri = format!("/todos/{}", id_of(&todo));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        assert_eq!(body, json!({"message": "Deleted successfully"}), "[{name}]");

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "[{name}]");

        let (status, error) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "[{name}]");
        assert_eq!(error["error"], "Delete failed", "[{name}]");
        assert_eq!(error["details"], "Target todo not found", "[{name}]");
    }
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
    for (name, app) in routers().await {
        let first = create(&app, json!({"title": "a"})).await;
        send(&app, Method::DELETE, &format!("/todos/{}", id_of(&first)), None).await;
        let second = create(&app, json!({"title": "b"})).await;
        assert!(id_of(&second) > id_of(&first), "[{name}]");
    }
}

// ---------------------------------------------------------------------------
// Store failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failures_are_server_errors_with_the_cause() {
    let app = router(Arc::new(AppState::new(FailingStore)));
    let cause = "corrupt todo row: disk unavailable";

    let (status, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch todos", "details": cause}));

    let (status, body) = send(&app, Method::GET, "/todos?keyword=milk", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch todos");

    let (status, body) = send(&app, Method::GET, "/todos/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch todo", "details": cause}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/todos",
        Some(json!({"title": "Buy milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to create todo", "details": cause}));
}

#[tokio::test]
async fn store_failures_on_update_and_delete_stay_not_found() {
    let app = router(Arc::new(AppState::new(FailingStore)));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/todos/1",
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Update failed");

    let (status, body) = send(&app, Method::DELETE, "/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Delete failed");
}

// ---------------------------------------------------------------------------
// Routing and CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_and_unknown_routes() {
    for (name, app) in routers().await {
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK, "[{name}]");
        assert_eq!(body, json!({"message": "ok"}), "[{name}]");

        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "[{name}]");
        assert!(body["error"].is_string(), "[{name}]");
    }
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let (_, app) = routers().await.remove(0);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/todos")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/todos/1")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
