//! `SQLite` todo store.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     id          INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title       TEXT    NOT NULL CHECK (title <> ''),
//!     completed   INTEGER NOT NULL DEFAULT 0,
//!     description TEXT,
//!     due_date    INTEGER,              -- unix milliseconds
//!     priority    TEXT    NOT NULL DEFAULT 'MEDIUM'
//!                 CHECK (priority IN ('HIGH', 'MEDIUM', 'LOW')),
//!     created_at  INTEGER NOT NULL,     -- unix milliseconds
//!     updated_at  INTEGER NOT NULL      -- unix milliseconds
//! );
//! ```
//!
//! `AUTOINCREMENT` keeps deleted ids from being handed out again. The table
//! is created on connect if it does not exist yet.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use todo_proto::{NewTodo, Priority, Todo, TodoChanges, TodoId};

use super::{StoreError, TodoStore, effective_keyword};

const CREATE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS todos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL CHECK (title <> ''),
    completed   INTEGER NOT NULL DEFAULT 0,
    description TEXT,
    due_date    INTEGER,
    priority    TEXT    NOT NULL DEFAULT 'MEDIUM'
                CHECK (priority IN ('HIGH', 'MEDIUM', 'LOW')),
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
)";

const SELECT_COLUMNS: &str =
    "SELECT id, title, completed, description, due_date, priority, created_at, updated_at \
     FROM todos";

/// A `todos` row as stored.
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    description: Option<String>,
    due_date: Option<i64>,
    priority: String,
    created_at: i64,
    updated_at: i64,
}

fn millis_to_instant(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {millis}")))
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority = Priority::from_str(&row.priority)
            .map_err(|e| StoreError::Corrupt(format!("row {}: {e}", row.id)))?;
        Ok(Self {
            id: TodoId::new(row.id),
            title: row.title,
            completed: row.completed,
            description: row.description,
            due_date: row.due_date.map(millis_to_instant).transpose()?,
            priority,
            created_at: millis_to_instant(row.created_at)?,
            updated_at: millis_to_instant(row.updated_at)?,
        })
    }
}

/// Todo store backed by a single `SQLite` table.
///
/// Uses a connection pool; updates run as a read-modify-write inside a
/// transaction so the partial-update rule in [`TodoChanges::apply`] is the
/// same one the in-memory store uses. That transaction takes the write lock
/// up front (`BEGIN IMMEDIATE`), so concurrent updates queue on the busy
/// timeout and the last one wins.
///
/// Keyword search runs through [`Todo::matches_keyword`] rather than `LIKE`,
/// which only folds ASCII case.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (e.g. `sqlite://todos.db`), creating the database
    /// file and the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL is invalid, the database
    /// cannot be opened, or the table cannot be created.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since
    /// every `SQLite` memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the table cannot be created.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the table cannot be created.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl TodoStore for SqliteStore {
    async fn list(&self, keyword: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        let keyword = effective_keyword(keyword);
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
        let rows: Vec<TodoRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let mut todos = Vec::with_capacity(rows.len());
        for row in rows {
            let todo = Todo::try_from(row)?;
            if keyword.is_none_or(|k| todo.matches_keyword(k)) {
                todos.push(todo);
            }
        }
        Ok(todos)
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Todo::try_from).transpose()
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let now = todo_proto::time::now();
        let result = sqlx::query(
            "INSERT INTO todos \
             (title, completed, description, due_date, priority, created_at, updated_at) \
             VALUES (?1, 0, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(new.due_date.map(|d| d.timestamp_millis()))
        .bind(new.priority.as_str())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let id = TodoId::new(result.last_insert_rowid());
        tracing::debug!(id = %id, "inserted todo row");
        Ok(Todo::from_new(id, new, now))
    }

    async fn update(&self, id: TodoId, changes: &TodoChanges) -> Result<Todo, StoreError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;
        let mut todo = Todo::try_from(row.ok_or(StoreError::NotFound(id))?)?;
        changes.apply(&mut todo, todo_proto::time::now());

        sqlx::query(
            "UPDATE todos SET title = ?1, completed = ?2, description = ?3, due_date = ?4, \
             priority = ?5, updated_at = ?6 WHERE id = ?7",
        )
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.description.as_deref())
        .bind(todo.due_date.map(|d| d.timestamp_millis()))
        .bind(todo.priority.as_str())
        .bind(todo.updated_at.timestamp_millis())
        .bind(id.get())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
