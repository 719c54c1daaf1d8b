//! HTTP error responses.
//!
//! Every failure leaves a handler as an [`ApiError`]: a status code plus the
//! `{error, details}` envelope. The constructors fix the wording per
//! operation so that clients see the same messages regardless of which
//! internal failure occurred.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use todo_proto::ErrorBody;

/// Status code and envelope for a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response body.
    pub body: ErrorBody,
}

impl ApiError {
    /// Creates an error response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(error, details),
        }
    }

    /// 500 for a failed list or search.
    #[must_use]
    pub fn list_failed(cause: &impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch todos",
            cause.to_string(),
        )
    }

    /// 404 for a single-todo fetch with an unknown or malformed id.
    #[must_use]
    pub fn todo_not_found(id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Todo not found",
            format!("No todo exists with id {id}"),
        )
    }

    /// 500 for a single-todo fetch that failed in the store.
    #[must_use]
    pub fn get_failed(cause: &impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch todo",
            cause.to_string(),
        )
    }

    /// 400 for a create request without a usable title.
    #[must_use]
    pub fn title_required() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Title is required",
            "The request body must include a title.",
        )
    }

    /// 400 for any other unusable create request.
    #[must_use]
    pub fn invalid_todo(cause: &impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid todo data", cause.to_string())
    }

    /// 500 for a create that failed in the store.
    #[must_use]
    pub fn create_failed(cause: &impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create todo",
            cause.to_string(),
        )
    }

    /// 404 for any failed update. Unknown ids and invalid data look the same.
    #[must_use]
    pub fn update_failed() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Update failed",
            "Todo not found or invalid data",
        )
    }

    /// 404 for any failed delete.
    #[must_use]
    pub fn delete_failed() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Delete failed",
            "Target todo not found",
        )
    }

    /// 404 for a path no route matches.
    #[must_use]
    pub fn route_not_found(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Resource not found",
            format!("No route for {path}"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
