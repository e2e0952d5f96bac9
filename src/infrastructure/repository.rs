//! Repository trait for todo lists.
//!
//! `ListRepository` is the storage seam of the application: handlers only
//! talk to this trait, and the backend (per-session memory or `PostgreSQL`)
//! is chosen at startup. Every method returns a boxed future so the trait
//! stays object-safe and can be shared as `Arc<dyn ListRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{ListId, NameError, Todo, TodoId, TodoList};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The referenced list does not exist.
    #[error("List not found: {0}")]
    ListNotFound(ListId),

    /// The referenced todo does not exist in its list.
    #[error("Todo not found: {todo_id} in list {list_id}")]
    TodoNotFound { list_id: ListId, todo_id: TodoId },

    /// The submitted name failed validation.
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// List Repository
// =============================================================================

/// Storage for lists and the todos they own.
///
/// Implementations apply validation and identifier assignment themselves, so
/// every backend enforces the same invariants. Mutations are atomic: a failed
/// operation leaves the store unchanged.
pub trait ListRepository: Send + Sync {
    /// Returns every list with its todos, ordered by id.
    fn all_lists(&self) -> RepositoryFuture<Vec<TodoList>>;

    /// Finds a list by id.
    ///
    /// Fails with `RepositoryError::ListNotFound` if the list does not exist.
    fn find_list(&self, list_id: ListId) -> RepositoryFuture<TodoList>;

    /// Creates an empty list named `name` with id `max(existing) + 1`.
    fn create_list(&self, name: &str) -> RepositoryFuture<TodoList>;

    /// Renames a list and returns it with its todos unchanged.
    ///
    /// The list's own current name does not count as a duplicate.
    fn rename_list(&self, list_id: ListId, name: &str) -> RepositoryFuture<TodoList>;

    /// Deletes a list and its todos.
    ///
    /// Returns `Ok(true)` if the list was deleted, `Ok(false)` if it didn't exist.
    fn delete_list(&self, list_id: ListId) -> RepositoryFuture<bool>;

    /// Appends an incomplete todo to a list.
    fn create_todo(&self, list_id: ListId, name: &str) -> RepositoryFuture<Todo>;

    /// Deletes a todo from a list.
    ///
    /// Returns `Ok(false)` if the todo was already absent; fails only when the
    /// list itself is missing.
    fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> RepositoryFuture<bool>;

    /// Sets the completion flag of a todo and returns the updated todo.
    fn set_todo_completed(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> RepositoryFuture<Todo>;

    /// Marks every todo of a list completed and returns the updated list.
    fn complete_all(&self, list_id: ListId) -> RepositoryFuture<TodoList>;
}

// =============================================================================
// Tests
// =============================================================================
