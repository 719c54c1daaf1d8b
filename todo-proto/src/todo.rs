//! The todo record and its scalar types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtoError;
use crate::request::NewTodo;

/// Store-assigned identifier of a todo. Never reused once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw integer id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ProtoError::InvalidTodoId(s.to_string()))
    }
}

/// Priority of a todo. Uppercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Do first.
    High,
    /// The default.
    #[default]
    Medium,
    /// Whenever.
    Low,
}

impl Priority {
    /// All priorities, highest first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProtoError::InvalidPriority(s.to_string()))
    }
}

/// A persisted todo as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Store-assigned id; immutable.
    pub id: TodoId,
    /// Never empty.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
    /// Free-form notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional deadline.
    #[serde(default, with = "crate::time::iso8601_option")]
    pub due_date: Option<DateTime<Utc>>,
    /// Priority, `MEDIUM` unless chosen otherwise.
    pub priority: Priority,
    /// Set once at creation.
    #[serde(with = "crate::time::iso8601")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation; never earlier than `created_at`.
    #[serde(with = "crate::time::iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Materializes a validated creation request under a freshly issued id.
    #[must_use]
    pub fn from_new(id: TodoId, new: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            completed: false,
            description: new.description,
            due_date: new.due_date,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive substring match against the title or description.
    ///
    /// An empty keyword matches everything.
    #[must_use]
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}
