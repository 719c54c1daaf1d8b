//! Shared wire types for the todo service.
//!
//! Both the server and the client speak JSON over HTTP using the types in
//! this crate. Validation of incoming requests and the partial-update rule
//! live here as well, so every store applies them identically.

pub mod envelope;
pub mod request;
pub mod time;
pub mod todo;

pub use envelope::{ErrorBody, MessageBody};
pub use request::{CreateTodo, NewTodo, TodoChanges, UpdateTodo};
pub use todo::{Priority, Todo, TodoId};

use thiserror::Error;

/// Errors raised while validating or parsing todo data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// The title was missing, null, or empty.
    #[error("title is required")]
    TitleRequired,
    /// A non-nullable field was explicitly set to `null`.
    #[error("{field} cannot be null")]
    NullNotAllowed {
        /// Wire name of the offending field.
        field: &'static str,
    },
    /// The due date could not be parsed as a date or date-time.
    #[error("invalid due date: {0}")]
    InvalidDueDate(String),
    /// The priority was not one of `HIGH`, `MEDIUM`, `LOW`.
    #[error("invalid priority: {0}")]
    InvalidPriority(String),
    /// A todo id could not be parsed as an integer.
    #[error("invalid todo id: {0}")]
    InvalidTodoId(String),
}
