//! Inline title editing.

use todo_proto::TodoId;

/// Whether a row is being edited, and the pending text if so.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    /// No row is being edited.
    #[default]
    Idle,
    /// Row `id` is being edited; `buffer` holds the unsaved title.
    Editing {
        /// Row under edit.
        id: TodoId,
        /// Unsaved title text.
        buffer: String,
    },
}

impl EditState {
    /// Id of the row under edit.
    #[must_use]
    pub const fn editing_id(&self) -> Option<TodoId> {
        match self {
            Self::Idle => None,
            Self::Editing { id, .. } => Some(*id),
        }
    }

    /// Current buffer text.
    #[must_use]
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { buffer, .. } => Some(buffer),
        }
    }

    /// Mutable access to the buffer, for in-place text editing.
    pub fn buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Idle => None,
            Self::Editing { buffer, .. } => Some(buffer),
        }
    }

    /// The title a commit would send, or `None` if there is nothing to send.
    ///
    /// Blank or whitespace-only buffers never produce a commit.
    #[must_use]
    pub fn pending_commit(&self) -> Option<(TodoId, &str)> {
        match self {
            Self::Editing { id, buffer } if !buffer.trim().is_empty() => Some((*id, buffer)),
            _ => None,
        }
    }
}
