//! Plain-text rendering of the todo list.

use std::fmt::Write as _;

use todo_proto::Todo;

use crate::view::EditState;

/// Date format for due dates.
const DUE_FORMAT: &str = "%Y-%m-%d";

/// One line for a todo, e.g. `[x] #3    HIGH   Buy milk (due 2026-01-21)`.
#[must_use]
pub fn todo_line(todo: &Todo) -> String {
    let mark = if todo.completed { 'x' } else { ' ' };
    let mut line = format!(
        "[{mark}] #{id:<4} {priority:<6} {title}",
        id = todo.id.get(),
        priority = todo.priority.as_str(),
        title = todo.title,
    );
    if let Some(due) = todo.due_date {
        let _ = write!(line, " (due {})", due.format(DUE_FORMAT));
    }
    line
}

/// Full listing with an optional keyword header and edit marker.
///
/// An empty list renders as a single explanatory line.
#[must_use]
pub fn todo_list(todos: &[Todo], keyword: &str, edit: &EditState) -> String {
    let mut out = String::new();
    if !keyword.is_empty() {
        let _ = writeln!(out, "Search: \"{keyword}\" ({} found)", todos.len());
    }
    if todos.is_empty() {
        out.push_str("No todos.\n");
        return out;
    }
    for todo in todos {
        out.push_str(&todo_line(todo));
        if edit.editing_id() == Some(todo.id) {
            out.push_str("  <- editing");
        }
        out.push('\n');
    }
    out
}

/// Multi-line detail view used by `show`.
#[must_use]
pub fn todo_detail(todo: &Todo) -> String {
    let mut out = todo_line(todo);
    out.push('\n');
    if let Some(description) = &todo.description {
        let _ = writeln!(out, "    {description}");
    }
    let _ = writeln!(
        out,
        "    created {}  updated {}",
        todo_proto::time::format(&todo.created_at),
        todo_proto::time::format(&todo.updated_at),
    );
    out
}
