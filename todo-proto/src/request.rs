//! Create and update request bodies, and their validated forms.
//!
//! [`UpdateTodo`] distinguishes a key that is absent from a key that is
//! present with `null`: every field is an `Option<Option<T>>` where the outer
//! layer records presence. [`TodoChanges::apply`] is the only place where a
//! partial update touches a [`Todo`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtoError;
use crate::time::parse_due_date;
use crate::todo::{Priority, Todo};

/// Body of `POST /todos`.
///
/// `title` is optional at the type level so that a missing or `null` title
/// is reported by [`CreateTodo::validate`] rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    /// Required, non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date-like string, e.g. `2026-01-21`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Defaults to `MEDIUM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A creation request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    /// Non-empty title.
    pub title: String,
    /// Optional notes.
    pub description: Option<String>,
    /// Parsed deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Resolved priority.
    pub priority: Priority,
}

impl CreateTodo {
    /// Starts a request with just a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date string.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Checks the request and resolves defaults.
    ///
    /// The title only has to be present and non-empty; whitespace is not
    /// trimmed. A blank due date counts as absent.
    ///
    /// # Errors
    ///
    /// [`ProtoError::TitleRequired`] for a missing or empty title,
    /// [`ProtoError::InvalidDueDate`] for an unparseable due date.
    pub fn validate(self) -> Result<NewTodo, ProtoError> {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .ok_or(ProtoError::TitleRequired)?;
        let due_date = self
            .due_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_due_date)
            .transpose()?;

        Ok(NewTodo {
            title,
            description: self.description,
            due_date,
            priority: self.priority.unwrap_or_default(),
        })
    }
}

/// Deserializes a present key into `Some(value)`, keeping `null` as `Some(None)`.
///
/// Combined with `#[serde(default)]`, an absent key stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `PUT /todos/{id}`. Only keys present in the body are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    /// New title; `null` is rejected.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    /// New completion flag; `null` is rejected.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<Option<bool>>,
    /// New description; `null` clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    /// New due date string; `null` or a blank string clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
    /// New priority; `null` is rejected.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Option<Priority>>,
}

impl UpdateTodo {
    /// Patch that only changes the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self::default().with_title(title)
    }

    /// Patch that only changes the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self::default().with_completed(completed)
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(Some(completed));
        self
    }

    /// Sets the description, or clears it with `None`.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets the due date string, or clears it with `None`.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<String>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(Some(priority));
        self
    }

    /// True if no key would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.completed.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }

    /// Checks every present field and parses the due date.
    ///
    /// # Errors
    ///
    /// [`ProtoError::NullNotAllowed`] for `null` on `title`, `completed` or
    /// `priority`; [`ProtoError::TitleRequired`] for an empty title;
    /// [`ProtoError::InvalidDueDate`] for an unparseable due date.
    pub fn validate(self) -> Result<TodoChanges, ProtoError> {
        let title = match self.title {
            None => None,
            Some(None) => return Err(ProtoError::NullNotAllowed { field: "title" }),
            Some(Some(t)) if t.is_empty() => return Err(ProtoError::TitleRequired),
            Some(Some(t)) => Some(t),
        };
        let completed = self
            .completed
            .map(|c| c.ok_or(ProtoError::NullNotAllowed { field: "completed" }))
            .transpose()?;
        let priority = self
            .priority
            .map(|p| p.ok_or(ProtoError::NullNotAllowed { field: "priority" }))
            .transpose()?;
        let due_date = match self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) if raw.trim().is_empty() => Some(None),
            Some(Some(raw)) => Some(Some(parse_due_date(&raw)?)),
        };

        Ok(TodoChanges {
            title,
            completed,
            description: self.description,
            due_date,
            priority,
        })
    }
}

/// A validated partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// Replacement description; `Some(None)` clears.
    pub description: Option<Option<String>>,
    /// Replacement due date; `Some(None)` clears.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement priority.
    pub priority: Option<Priority>,
}

impl TodoChanges {
    /// Applies the present fields to `todo` and refreshes `updated_at`.
    ///
    /// `id` and `created_at` are never touched, and `updated_at` never moves
    /// before `created_at`.
    pub fn apply(&self, todo: &mut Todo, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            todo.title.clone_from(title);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(description) = &self.description {
            todo.description.clone_from(description);
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        todo.updated_at = now.max(todo.created_at);
    }
}
