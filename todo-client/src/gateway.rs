//! Client data gateway: typed calls to the todo REST API.
//!
//! [`TodoApi`] is the seam the view controller depends on; [`HttpGateway`]
//! is the production implementation over `reqwest`. Every non-2xx response
//! fails fast with a fixed per-operation message. The server's error body is
//! never read, and nothing is retried.

use std::future::Future;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use todo_proto::{CreateTodo, MessageBody, Todo, TodoId, UpdateTodo};
use url::Url;

/// Default server location.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// The gateway operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing or searching todos.
    Load,
    /// Fetching a single todo.
    Fetch,
    /// Creating a todo.
    Create,
    /// Updating a todo.
    Update,
    /// Deleting a todo.
    Delete,
}

impl Operation {
    /// Fixed, user-facing message for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load todos",
            Self::Fetch => "Failed to load todo",
            Self::Create => "Failed to create todo",
            Self::Update => "Failed to update todo",
            Self::Delete => "Failed to delete todo",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.failure_message())
    }
}

/// Errors returned by a [`TodoApi`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The server answered with a non-success status.
    #[error("{op} (HTTP {status})")]
    Status {
        /// Operation that failed.
        op: Operation,
        /// Status the server returned.
        status: StatusCode,
    },

    /// The request never produced a response.
    #[error("{op}: {source}")]
    Transport {
        /// Operation that failed.
        op: Operation,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("{op}: malformed response: {source}")]
    Decode {
        /// Operation that failed.
        op: Operation,
        /// Underlying decode error.
        source: reqwest::Error,
    },

    /// The server URL could not be parsed or extended.
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    /// The operation this error belongs to, if it came from a request.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Status { op, .. } | Self::Transport { op, .. } | Self::Decode { op, .. } => {
                Some(*op)
            }
            Self::Url(_) => None,
        }
    }
}

/// Typed access to the todo API.
pub trait TodoApi: Send + Sync {
    /// Lists todos, filtered server-side when `keyword` is non-empty.
    fn fetch_todos(
        &self,
        keyword: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Todo>, GatewayError>> + Send;

    /// Fetches one todo.
    fn fetch_todo(&self, id: TodoId) -> impl Future<Output = Result<Todo, GatewayError>> + Send;

    /// Creates a todo and returns the stored record.
    fn create_todo(
        &self,
        request: &CreateTodo,
    ) -> impl Future<Output = Result<Todo, GatewayError>> + Send;

    /// Applies a partial update and returns the stored record.
    fn update_todo(
        &self,
        id: TodoId,
        patch: &UpdateTodo,
    ) -> impl Future<Output = Result<Todo, GatewayError>> + Send;

    /// Deletes a todo.
    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// [`TodoApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Creates a gateway for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Url`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self::with_client(Client::new(), Url::parse(base_url)?))
    }

    /// Creates a gateway with a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(client: Client, mut base: Url) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn todos_url(&self) -> Result<Url, GatewayError> {
        Ok(self.base.join("todos")?)
    }

    fn todo_url(&self, id: TodoId) -> Result<Url, GatewayError> {
        Ok(self.base.join(&format!("todos/{id}"))?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: Operation,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Transport { op, source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, ?op, "server rejected request");
            return Err(GatewayError::Status { op, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| GatewayError::Decode { op, source })
    }
}

impl TodoApi for HttpGateway {
    async fn fetch_todos(&self, keyword: Option<&str>) -> Result<Vec<Todo>, GatewayError> {
        let mut url = self.todos_url()?;
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            url.query_pairs_mut().append_pair("keyword", keyword);
        }
        tracing::debug!(%url, "fetching todos");
        self.send(Operation::Load, self.client.get(url)).await
    }

    async fn fetch_todo(&self, id: TodoId) -> Result<Todo, GatewayError> {
        let url = self.todo_url(id)?;
        self.send(Operation::Fetch, self.client.get(url)).await
    }

    async fn create_todo(&self, request: &CreateTodo) -> Result<Todo, GatewayError> {
        let url = self.todos_url()?;
        tracing::debug!(%url, "creating todo");
        self.send(Operation::Create, self.client.post(url).json(request))
            .await
    }

    async fn update_todo(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, GatewayError> {
        let url = self.todo_url(id)?;
        tracing::debug!(%url, "updating todo");
        self.send(Operation::Update, self.client.put(url).json(patch))
            .await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<(), GatewayError> {
        let url = self.todo_url(id)?;
        tracing::debug!(%url, "deleting todo");
        let _: MessageBody = self.send(Operation::Delete, self.client.delete(url)).await?;
        Ok(())
    }
}
