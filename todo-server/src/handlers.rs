//! Request handlers for the `/todos` resource.
//!
//! Handlers are generic over the [`TodoStore`] so the same routing code runs
//! against [`crate::store::MemoryStore`] in tests and
//! [`crate::store::SqliteStore`] in production. Each failure is logged with
//! its real cause before being collapsed into the fixed response envelope
//! from [`ApiError`].

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use serde_json::Value;
use todo_proto::{CreateTodo, MessageBody, ProtoError, Todo, TodoId, UpdateTodo};

use crate::error::ApiError;
use crate::store::{StoreError, TodoStore};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState<S> {
    /// Backing record store.
    pub store: S,
}

impl<S: TodoStore> AppState<S> {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

/// Query string of `GET /todos`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    /// Case-insensitive filter over title and description.
    pub keyword: Option<String>,
}

/// Internal failure kinds. Kept distinct for logging even where the
/// response collapses them.
#[derive(Debug, thiserror::Error)]
enum HandlerError {
    #[error("invalid id: {0}")]
    BadId(ProtoError),
    #[error("invalid update: {0}")]
    Invalid(ProtoError),
    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `GET /todos[?keyword=]`
pub async fn list_todos<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    match state.store.list(query.keyword.as_deref()).await {
        Ok(todos) => {
            tracing::debug!(count = todos.len(), keyword = ?query.keyword, "listed todos");
            Ok(Json(todos))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list todos");
            Err(ApiError::list_failed(&e))
        }
    }
}

/// `GET /todos/{id}`
pub async fn get_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let Ok(id) = TodoId::from_str(&raw_id) else {
        tracing::debug!(id = %raw_id, "unparseable todo id");
        return Err(ApiError::todo_not_found(&raw_id));
    };

    match state.store.get(id).await {
        Ok(Some(todo)) => Ok(Json(todo)),
        Ok(None) => Err(ApiError::todo_not_found(&raw_id)),
        Err(e) => {
            tracing::error!(%id, error = %e, "failed to fetch todo");
            Err(ApiError::get_failed(&e))
        }
    }
}

/// `POST /todos`
///
/// The body is read as raw bytes so that a missing `Content-Type` is not an
/// error and malformed JSON produces the usual envelope.
pub async fn create_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "malformed create body");
        ApiError::invalid_todo(&e)
    })?;
    if title_is_falsy(&value) {
        return Err(ApiError::title_required());
    }

    let request: CreateTodo = serde_json::from_value(value).map_err(|e| {
        tracing::warn!(error = %e, "create body does not match schema");
        ApiError::invalid_todo(&e)
    })?;
    let new = request.validate().map_err(|e| match e {
        ProtoError::TitleRequired => ApiError::title_required(),
        other => {
            tracing::warn!(error = %other, "rejected create request");
            ApiError::invalid_todo(&other)
        }
    })?;

    match state.store.insert(new).await {
        Ok(todo) => {
            tracing::info!(id = %todo.id, "created todo");
            Ok((StatusCode::CREATED, Json(todo)))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create todo");
            Err(ApiError::create_failed(&e))
        }
    }
}

/// `PUT /todos/{id}`
///
/// Every failure, including a validation error, is reported as 404.
pub async fn update_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    match apply_update(&state.store, &raw_id, &body).await {
        Ok(todo) => {
            tracing::info!(id = %todo.id, "updated todo");
            Ok(Json(todo))
        }
        Err(e) => {
            tracing::warn!(id = %raw_id, error = %e, "update failed");
            Err(ApiError::update_failed())
        }
    }
}

/// `DELETE /todos/{id}`
pub async fn delete_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let result = match TodoId::from_str(&raw_id) {
        Ok(id) => state.store.delete(id).await.map_err(HandlerError::from),
        Err(e) => Err(HandlerError::BadId(e)),
    };

    match result {
        Ok(()) => {
            tracing::info!(id = %raw_id, "deleted todo");
            Ok(Json(MessageBody::new("Deleted successfully")))
        }
        Err(e) => {
            tracing::warn!(id = %raw_id, error = %e, "delete failed");
            Err(ApiError::delete_failed())
        }
    }
}

/// `GET /health`
pub async fn health() -> Json<MessageBody> {
    Json(MessageBody::new("ok"))
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

async fn apply_update<S: TodoStore>(
    store: &S,
    raw_id: &str,
    body: &[u8],
) -> Result<Todo, HandlerError> {
    let id = TodoId::from_str(raw_id).map_err(HandlerError::BadId)?;
    let request: UpdateTodo = serde_json::from_slice(body)?;
    let changes = request.validate().map_err(HandlerError::Invalid)?;
    Ok(store.update(id, &changes).await?)
}

/// Missing, `null`, `false`, `0` and `""` all count as no title.
fn title_is_falsy(body: &Value) -> bool {
    match body.get("title") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_none_or(|f| f.abs() < f64::EPSILON),
        Some(_) => false,
    }
}
