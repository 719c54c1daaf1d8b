//! Record store for todos.
//!
//! Handlers only see the [`TodoStore`] trait; the concrete store is injected
//! into [`crate::handlers::AppState`] when the router is built. Two
//! implementations exist: [`MemoryStore`] for tests and throwaway runs, and
//! [`SqliteStore`] for a persistent relational table.

pub mod memory;
pub mod sqlite;

use std::future::Future;

use todo_proto::{NewTodo, Todo, TodoChanges, TodoId};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors returned by a [`TodoStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No todo exists with the given id.
    #[error("todo not found: {0}")]
    NotFound(TodoId),

    /// The database rejected or failed a query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a [`Todo`].
    #[error("corrupt todo row: {0}")]
    Corrupt(String),
}

/// Persistent collection of todos.
///
/// Implementations own id assignment (ids are never reused) and the
/// `created_at`/`updated_at` timestamps. Concurrent writers are serialized by
/// the store itself; the last write to a row wins.
pub trait TodoStore: Send + Sync + 'static {
    /// Returns todos newest first, optionally filtered by a case-insensitive
    /// keyword over title and description. An empty keyword is ignored.
    fn list(
        &self,
        keyword: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send;

    /// Returns the todo with the given id, if any.
    fn get(&self, id: TodoId) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send;

    /// Persists a new todo under a freshly issued id.
    fn insert(&self, new: NewTodo) -> impl Future<Output = Result<Todo, StoreError>> + Send;

    /// Applies a partial update and returns the updated todo.
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist.
    fn update(
        &self,
        id: TodoId,
        changes: &TodoChanges,
    ) -> impl Future<Output = Result<Todo, StoreError>> + Send;

    /// Hard-deletes a todo.
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist.
    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Treats an empty or missing keyword as "no filter".
pub(crate) fn effective_keyword(keyword: Option<&str>) -> Option<&str> {
    keyword.filter(|k| !k.is_empty())
}

/// Newest first; ties broken by the higher id.
pub(crate) fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
