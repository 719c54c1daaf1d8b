//! In-memory todo store.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use todo_proto::{NewTodo, Todo, TodoChanges, TodoId};

use super::{StoreError, TodoStore, effective_keyword, sort_newest_first};

/// Rows plus the next id to issue. Guarded together so id issue and insert
/// are one step.
#[derive(Debug)]
struct Table {
    rows: BTreeMap<TodoId, Todo>,
    next_id: i64,
}

/// Todo store held in process memory.
///
/// Thread-safe via [`RwLock`]. Ids start at 1 and only ever grow, so a
/// deleted id is never handed out again.
#[derive(Debug)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored todos.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// True if the store holds no todos.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl TodoStore for MemoryStore {
    async fn list(&self, keyword: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        let keyword = effective_keyword(keyword);
        let table = self.table.read().await;
        let mut todos: Vec<Todo> = table
            .rows
            .values()
            .filter(|t| keyword.is_none_or(|k| t.matches_keyword(k)))
            .cloned()
            .collect();
        drop(table);
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        let id = TodoId::new(table.next_id);
        table.next_id += 1;
        let todo = Todo::from_new(id, new, todo_proto::time::now());
        table.rows.insert(id, todo.clone());
        drop(table);
        Ok(todo)
    }

    async fn update(&self, id: TodoId, changes: &TodoChanges) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        let todo = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        changes.apply(todo, todo_proto::time::now());
        Ok(todo.clone())
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
