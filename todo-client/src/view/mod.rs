//! View state controller.
//!
//! [`TodoView`] holds the client's copy of the list plus UI-only state (the
//! search keyword and the inline edit target) and merges gateway results into
//! it. Nothing is applied optimistically: every mutation waits for the server
//! and then reconciles the returned record into the list.
//!
//! Failures come back as [`ViewError`], whose display is the fixed alert text
//! the presentation layer shows. The gateway's own error is logged and then
//! dropped.

mod edit;

pub use edit::EditState;

use todo_proto::{CreateTodo, Todo, TodoId, UpdateTodo};

use crate::gateway::{GatewayError, TodoApi};

/// Errors surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The list could not be loaded or searched.
    #[error("Failed to load todos")]
    Load,
    /// A single todo could not be fetched.
    #[error("Failed to load todo")]
    Fetch,
    /// A todo could not be created.
    #[error("Failed to create todo")]
    Create,
    /// A todo could not be updated.
    #[error("Failed to update todo")]
    Update,
    /// A todo could not be deleted.
    #[error("Failed to delete todo")]
    Delete,
    /// The id is not in the current list.
    #[error("No todo with id {0} in the list")]
    UnknownTodo(TodoId),
}

/// Client-side list state over a [`TodoApi`].
#[derive(Debug)]
pub struct TodoView<A> {
    api: A,
    todos: Vec<Todo>,
    keyword: String,
    edit: EditState,
    error: Option<String>,
}

impl<A: TodoApi> TodoView<A> {
    /// Creates an empty view. Call [`TodoView::load`] to populate it.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            todos: Vec::new(),
            keyword: String::new(),
            edit: EditState::Idle,
            error: None,
        }
    }

    /// Todos in display order.
    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Looks up a listed todo.
    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Current search keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Inline edit state.
    #[must_use]
    pub const fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Inline message from the last failed list load, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The underlying gateway.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    // -- Loading and search --

    /// Fetches the list for the current keyword and replaces local state.
    ///
    /// On failure the previous list is kept and [`TodoView::error`] is set.
    ///
    /// # Errors
    ///
    /// [`ViewError::Load`] if the gateway call fails.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let keyword = Some(self.keyword.as_str()).filter(|k| !k.is_empty());
        match self.api.fetch_todos(keyword).await {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), keyword = %self.keyword, "list loaded");
                self.todos = todos;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                log_failure(&e);
                self.error = Some(ViewError::Load.to_string());
                Err(ViewError::Load)
            }
        }
    }

    /// Sets the keyword without fetching. Searching is explicit.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    /// Re-fetches the list filtered by the current keyword.
    ///
    /// # Errors
    ///
    /// [`ViewError::Load`] if the gateway call fails.
    pub async fn search(&mut self) -> Result<(), ViewError> {
        self.load().await
    }

    /// Fetches one todo from the server without touching the list.
    ///
    /// # Errors
    ///
    /// [`ViewError::Fetch`] if the gateway call fails.
    pub async fn fetch(&self, id: TodoId) -> Result<Todo, ViewError> {
        self.api.fetch_todo(id).await.map_err(|e| {
            log_failure(&e);
            ViewError::Fetch
        })
    }

    // -- Mutations --

    /// Creates a todo and prepends it to the list.
    ///
    /// A missing or blank title is ignored and returns `Ok(None)` without
    /// calling the server.
    ///
    /// # Errors
    ///
    /// [`ViewError::Create`] if the gateway call fails.
    pub async fn add(&mut self, request: CreateTodo) -> Result<Option<Todo>, ViewError> {
        if request.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Ok(None);
        }
        let todo = self.api.create_todo(&request).await.map_err(|e| {
            log_failure(&e);
            ViewError::Create
        })?;
        self.todos.insert(0, todo.clone());
        Ok(Some(todo))
    }

    /// Flips `completed` on a listed todo.
    ///
    /// # Errors
    ///
    /// [`ViewError::UnknownTodo`] if the id is not listed,
    /// [`ViewError::Update`] if the gateway call fails.
    pub async fn toggle(&mut self, id: TodoId) -> Result<Todo, ViewError> {
        let completed = self.todo(id).ok_or(ViewError::UnknownTodo(id))?.completed;
        self.update(id, UpdateTodo::completed(!completed)).await
    }

    /// Sends a partial update and replaces the matching row with the result.
    ///
    /// # Errors
    ///
    /// [`ViewError::Update`] if the gateway call fails.
    pub async fn update(&mut self, id: TodoId, patch: UpdateTodo) -> Result<Todo, ViewError> {
        let todo = self.api.update_todo(id, &patch).await.map_err(|e| {
            log_failure(&e);
            ViewError::Update
        })?;
        self.replace(todo.clone());
        Ok(todo)
    }

    /// Deletes a listed todo after `confirm` approves it.
    ///
    /// Returns `Ok(false)` if the user declined; nothing is sent in that case.
    ///
    /// # Errors
    ///
    /// [`ViewError::UnknownTodo`] if the id is not listed,
    /// [`ViewError::Delete`] if the gateway call fails.
    pub async fn delete(
        &mut self,
        id: TodoId,
        confirm: impl FnOnce(&Todo) -> bool,
    ) -> Result<bool, ViewError> {
        let todo = self.todo(id).ok_or(ViewError::UnknownTodo(id))?;
        if !confirm(todo) {
            tracing::debug!(%id, "delete declined");
            return Ok(false);
        }

        self.api.delete_todo(id).await.map_err(|e| {
            log_failure(&e);
            ViewError::Delete
        })?;
        self.todos.retain(|t| t.id != id);
        if self.edit.editing_id() == Some(id) {
            self.edit = EditState::Idle;
        }
        Ok(true)
    }

    // -- Inline edit --

    /// Starts editing a listed row, seeding the buffer with its title.
    ///
    /// Any edit already in progress is discarded.
    ///
    /// # Errors
    ///
    /// [`ViewError::UnknownTodo`] if the id is not listed.
    pub fn start_edit(&mut self, id: TodoId) -> Result<(), ViewError> {
        let title = self.todo(id).ok_or(ViewError::UnknownTodo(id))?.title.clone();
        self.edit = EditState::Editing { id, buffer: title };
        Ok(())
    }

    /// Mutable edit buffer, if editing.
    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.edit.buffer_mut()
    }

    /// Replaces the edit buffer. Returns `false` when not editing.
    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> bool {
        let Some(buffer) = self.edit_buffer_mut() else {
            return false;
        };
        *buffer = text.into();
        true
    }

    /// Leaves edit mode without saving.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    /// Saves the edit buffer as the row's new title.
    ///
    /// Returns `Ok(None)` without contacting the server when idle or when the
    /// buffer is blank; a blank buffer stays in edit mode. On success the row
    /// is replaced and the view returns to idle. On failure it stays in edit
    /// mode so the user can retry.
    ///
    /// # Errors
    ///
    /// [`ViewError::Update`] if the gateway call fails.
    pub async fn commit_edit(&mut self) -> Result<Option<Todo>, ViewError> {
        let Some((id, title)) = self.edit.pending_commit() else {
            return Ok(None);
        };
        let patch = UpdateTodo::title(title);

        let todo = self.update(id, patch).await?;
        self.edit = EditState::Idle;
        Ok(Some(todo))
    }

    fn replace(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }
}

fn log_failure(error: &GatewayError) {
    tracing::warn!(error = %error, "gateway call failed");
}
