//! Todo list domain model.
//!
//! A [`TodoList`] owns an ordered sequence of [`Todo`] items. Identifiers are
//! plain integers assigned as `max(existing) + 1`, so list ids are unique among
//! lists and todo ids are unique only within their parent list.

use serde::{Deserialize, Serialize};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Identifier of a todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListId(i64);

impl ListId {
    /// Creates a `ListId` from its integer value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Parses an identifier from a path segment.
    ///
    /// Returns `None` for anything that is not a decimal integer.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(Self)
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a todo, unique within its parent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a `TodoId` from its integer value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Parses an identifier from a path segment.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(Self)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Identifier Assignment
// =============================================================================

/// Computes the next identifier for a collection.
///
/// Returns `max(ids) + 1`, or `1` when `ids` is empty. No counter is kept, so
/// removing the entity with the highest id makes that id available again.
///
/// # Example
///
/// ```
/// use todo_lists::domain::next_id;
///
/// assert_eq!(next_id(Vec::<i64>::new()), 1);
/// assert_eq!(next_id([3, 1, 2]), 4);
/// ```
#[must_use]
pub fn next_id(ids: impl IntoIterator<Item = i64>) -> i64 {
    ids.into_iter().max().map_or(1, |max| max + 1)
}

// =============================================================================
// Todo
// =============================================================================

/// A named item with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier within the parent list.
    pub todo_id: TodoId,
    /// Display name (1 to 100 characters).
    pub name: String,
    /// Whether the todo is done.
    pub completed: bool,
}

impl Todo {
    /// Creates an incomplete todo.
    #[must_use]
    pub fn new(todo_id: TodoId, name: impl Into<String>) -> Self {
        Self {
            todo_id,
            name: name.into(),
            completed: false,
        }
    }

    /// Returns a copy with the completion flag replaced.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

// =============================================================================
// TodoList
// =============================================================================

/// A named, ordered collection of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Identifier among all lists in the store.
    pub list_id: ListId,
    /// Display name, unique among lists.
    pub name: String,
    /// Todos in creation order.
    pub todos: Vec<Todo>,
}

impl TodoList {
    /// Creates a list with no todos.
    #[must_use]
    pub fn new(list_id: ListId, name: impl Into<String>) -> Self {
        Self {
            list_id,
            name: name.into(),
            todos: Vec::new(),
        }
    }

    /// Returns a copy with the given todos.
    #[must_use]
    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    /// Looks up a todo by id for mutation.
    pub fn find_todo_mut(&mut self, todo_id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.todo_id == todo_id)
    }

    /// Returns the id the next created todo will receive.
    #[must_use]
    pub fn next_todo_id(&self) -> TodoId {
        TodoId::new(next_id(self.todos.iter().map(|todo| todo.todo_id.value())))
    }

    /// Number of todos not yet completed.
    #[must_use]
    pub fn todos_remaining_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }

    /// A list is complete when it has at least one todo and none remain.
    ///
    /// An empty list is never complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.todos.is_empty() && self.todos_remaining_count() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
