//! In-memory repository implementation.
//!
//! `InMemoryListRepository` keeps the lists of a single client session. It is
//! the default backend: the session store creates one per session and drops
//! it when the session expires.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Every mutation validates and applies under one write lock
//! - All operations return boxed futures for use behind `dyn ListRepository`

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{
    ListId, Todo, TodoId, TodoList, next_id, validate_list_name, validate_todo_name,
};
use crate::infrastructure::{ListRepository, RepositoryError, RepositoryFuture};

// =============================================================================
// Lookup Helpers
// =============================================================================

/// Returns the position of a list in the collection.
fn position_of(lists: &[TodoList], list_id: ListId) -> Result<usize, RepositoryError> {
    lists
        .iter()
        .position(|list| list.list_id == list_id)
        .ok_or(RepositoryError::ListNotFound(list_id))
}

/// Names of every list except `excluded`.
fn other_names(lists: &[TodoList], excluded: Option<ListId>) -> impl Iterator<Item = &str> {
    lists
        .iter()
        .filter(move |list| Some(list.list_id) != excluded)
        .map(|list| list.name.as_str())
}

// =============================================================================
// In-Memory List Repository
// =============================================================================

/// In-memory implementation of `ListRepository`.
///
/// Lists are kept in creation order in a `Vec`, wrapped in `Arc<RwLock<...>>`
/// so clones share the same storage.
///
/// # Example
///
/// ```ignore
/// use todo_lists::infrastructure::{InMemoryListRepository, ListRepository};
///
/// let repository = InMemoryListRepository::new();
/// let list = repository.create_list("Groceries").await?;
/// let todo = repository.create_todo(list.list_id, "Milk").await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryListRepository {
    lists: Arc<RwLock<Vec<TodoList>>>,
}

impl InMemoryListRepository {
    /// Creates a new empty in-memory list repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl ListRepository for InMemoryListRepository {
    fn all_lists(&self) -> RepositoryFuture<Vec<TodoList>> {
        let lists = Arc::clone(&self.lists);
        async move {
            let guard = lists.read().await;
            let mut all: Vec<TodoList> = guard.clone();
            all.sort_by_key(|list| list.list_id);
            Ok(all)
        }
        .boxed()
    }

    fn find_list(&self, list_id: ListId) -> RepositoryFuture<TodoList> {
        let lists = Arc::clone(&self.lists);
        async move {
            let guard = lists.read().await;
            let index = position_of(&guard, list_id)?;
            Ok(guard[index].clone())
        }
        .boxed()
    }

    fn create_list(&self, name: &str) -> RepositoryFuture<TodoList> {
        let lists = Arc::clone(&self.lists);
        let name = name.to_string();
        async move {
            let mut guard = lists.write().await;
            validate_list_name(&name, other_names(&guard, None))?;

            let list_id = ListId::new(next_id(guard.iter().map(|list| list.list_id.value())));
            let list = TodoList::new(list_id, name);
            guard.push(list.clone());

            tracing::debug!(%list_id, "List created");
            Ok(list)
        }
        .boxed()
    }

    fn rename_list(&self, list_id: ListId, name: &str) -> RepositoryFuture<TodoList> {
        let lists = Arc::clone(&self.lists);
        let name = name.to_string();
        async move {
            let mut guard = lists.write().await;
            let index = position_of(&guard, list_id)?;
            validate_list_name(&name, other_names(&guard, Some(list_id)))?;

            guard[index].name = name;

            tracing::debug!(%list_id, "List renamed");
            Ok(guard[index].clone())
        }
        .boxed()
    }

    fn delete_list(&self, list_id: ListId) -> RepositoryFuture<bool> {
        let lists = Arc::clone(&self.lists);
        async move {
            let mut guard = lists.write().await;
            let before = guard.len();
            guard.retain(|list| list.list_id != list_id);
            let deleted = guard.len() != before;

            tracing::debug!(%list_id, deleted, "List delete requested");
            Ok(deleted)
        }
        .boxed()
    }

    fn create_todo(&self, list_id: ListId, name: &str) -> RepositoryFuture<Todo> {
        let lists = Arc::clone(&self.lists);
        let name = name.to_string();
        async move {
            let mut guard = lists.write().await;
            let index = position_of(&guard, list_id)?;
            validate_todo_name(&name)?;

            let list = &mut guard[index];
            let todo = Todo::new(list.next_todo_id(), name);
            list.todos.push(todo.clone());

            tracing::debug!(%list_id, todo_id = %todo.todo_id, "Todo created");
            Ok(todo)
        }
        .boxed()
    }

    fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> RepositoryFuture<bool> {
        let lists = Arc::clone(&self.lists);
        async move {
            let mut guard = lists.write().await;
            let index = position_of(&guard, list_id)?;

            let todos = &mut guard[index].todos;
            let before = todos.len();
            todos.retain(|todo| todo.todo_id != todo_id);
            let deleted = todos.len() != before;

            tracing::debug!(%list_id, %todo_id, deleted, "Todo delete requested");
            Ok(deleted)
        }
        .boxed()
    }

    fn set_todo_completed(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> RepositoryFuture<Todo> {
        let lists = Arc::clone(&self.lists);
        async move {
            let mut guard = lists.write().await;
            let index = position_of(&guard, list_id)?;

            let todo = guard[index]
                .find_todo_mut(todo_id)
                .ok_or(RepositoryError::TodoNotFound { list_id, todo_id })?;
            todo.completed = completed;

            tracing::debug!(%list_id, %todo_id, completed, "Todo completion updated");
            Ok(todo.clone())
        }
        .boxed()
    }

    fn complete_all(&self, list_id: ListId) -> RepositoryFuture<TodoList> {
        let lists = Arc::clone(&self.lists);
        async move {
            let mut guard = lists.write().await;
            let index = position_of(&guard, list_id)?;

            let list = &mut guard[index];
            for todo in &mut list.todos {
                todo.completed = true;
            }

            tracing::debug!(%list_id, todo_count = list.todos.len(), "All todos completed");
            Ok(list.clone())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NameError;
    use rstest::rstest;

    async fn repository_with(names: &[&str]) -> InMemoryListRepository {
        let repository = InMemoryListRepository::new();
        for name in names {
            repository.create_list(name).await.unwrap();
        }
        repository
    }

    // -------------------------------------------------------------------------
    // List Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_create_list_assigns_next_id() {
        let repository = repository_with(&["A", "B"]).await;

        let list = repository.create_list("C").await.unwrap();

        assert_eq!(list.list_id, ListId::new(3));
        assert_eq!(list.name, "C");
        assert!(list.todos.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_list_rejects_duplicate_and_keeps_one() {
        let repository = repository_with(&["A"]).await;

        let result = repository.create_list("A").await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidName(NameError::DuplicateName))
        );
        assert_eq!(repository.all_lists().await.unwrap().len(), 1);
    }

    #[rstest]
    #[case(String::new())]
    #[case("x".repeat(101))]
    #[tokio::test]
    async fn test_create_list_rejects_invalid_length(#[case] name: String) {
        let repository = InMemoryListRepository::new();

        let result = repository.create_list(&name).await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidName(NameError::InvalidLength))
        );
        assert!(repository.all_lists().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let repository = repository_with(&["A", "B"]).await;

        assert!(repository.delete_list(ListId::new(1)).await.unwrap());

        assert_eq!(
            repository.find_list(ListId::new(1)).await,
            Err(RepositoryError::ListNotFound(ListId::new(1)))
        );
        assert!(repository.find_list(ListId::new(2)).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_list_is_idempotent() {
        let repository = repository_with(&["A"]).await;

        assert!(repository.delete_list(ListId::new(1)).await.unwrap());
        assert!(!repository.delete_list(ListId::new(1)).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_deleting_highest_id_reuses_it() {
        let repository = repository_with(&["A", "B"]).await;
        repository.delete_list(ListId::new(2)).await.unwrap();

        let list = repository.create_list("C").await.unwrap();

        assert_eq!(list.list_id, ListId::new(2));
    }

    #[rstest]
    #[tokio::test]
    async fn test_rename_keeps_id_and_todos() {
        let repository = repository_with(&["Groceries"]).await;
        let list_id = ListId::new(1);
        repository.create_todo(list_id, "Milk").await.unwrap();

        repository.rename_list(list_id, "Shopping").await.unwrap();
        let found = repository.find_list(list_id).await.unwrap();

        assert_eq!(found.list_id, list_id);
        assert_eq!(found.name, "Shopping");
        assert_eq!(found.todos.len(), 1);
        assert_eq!(found.todos[0].name, "Milk");
    }

    #[rstest]
    #[tokio::test]
    async fn test_rename_to_own_name_is_accepted() {
        let repository = repository_with(&["Groceries"]).await;

        let result = repository.rename_list(ListId::new(1), "Groceries").await;

        assert!(result.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn test_rename_to_other_name_is_duplicate() {
        let repository = repository_with(&["A", "B"]).await;

        let result = repository.rename_list(ListId::new(2), "A").await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidName(NameError::DuplicateName))
        );
        assert_eq!(repository.find_list(ListId::new(2)).await.unwrap().name, "B");
    }

    #[rstest]
    #[tokio::test]
    async fn test_rename_missing_list() {
        let repository = InMemoryListRepository::new();

        let result = repository.rename_list(ListId::new(9), "X").await;

        assert_eq!(result, Err(RepositoryError::ListNotFound(ListId::new(9))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_all_lists_ordered_by_id() {
        let repository = repository_with(&["A", "B", "C"]).await;
        repository.delete_list(ListId::new(1)).await.unwrap();
        repository.create_list("D").await.unwrap();

        let ids: Vec<i64> = repository
            .all_lists()
            .await
            .unwrap()
            .iter()
            .map(|list| list.list_id.value())
            .collect();

        assert_eq!(ids, vec![2, 3, 4]);
    }

    // -------------------------------------------------------------------------
    // Todo Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_todo_ids_are_scoped_to_list() {
        let repository = repository_with(&["A", "B"]).await;

        let first = repository.create_todo(ListId::new(1), "x").await.unwrap();
        let second = repository.create_todo(ListId::new(1), "y").await.unwrap();
        let other = repository.create_todo(ListId::new(2), "z").await.unwrap();

        assert_eq!(first.todo_id, TodoId::new(1));
        assert_eq!(second.todo_id, TodoId::new(2));
        assert_eq!(other.todo_id, TodoId::new(1));
        assert!(!first.completed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_validates_name() {
        let repository = repository_with(&["A"]).await;

        let result = repository.create_todo(ListId::new(1), "").await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidName(NameError::InvalidLength))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_missing_list() {
        let repository = InMemoryListRepository::new();

        let result = repository.create_todo(ListId::new(1), "Milk").await;

        assert_eq!(result, Err(RepositoryError::ListNotFound(ListId::new(1))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_todo_is_idempotent() {
        let repository = repository_with(&["A"]).await;
        let list_id = ListId::new(1);
        let todo = repository.create_todo(list_id, "Milk").await.unwrap();

        assert!(repository.delete_todo(list_id, todo.todo_id).await.unwrap());
        assert!(!repository.delete_todo(list_id, todo.todo_id).await.unwrap());
        assert!(repository.find_list(list_id).await.unwrap().todos.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_todo_missing_list() {
        let repository = InMemoryListRepository::new();

        let result = repository.delete_todo(ListId::new(1), TodoId::new(1)).await;

        assert_eq!(result, Err(RepositoryError::ListNotFound(ListId::new(1))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_todo_completed_toggles() {
        let repository = repository_with(&["A"]).await;
        let list_id = ListId::new(1);
        let todo = repository.create_todo(list_id, "Milk").await.unwrap();

        let done = repository
            .set_todo_completed(list_id, todo.todo_id, true)
            .await
            .unwrap();
        assert!(done.completed);

        let undone = repository
            .set_todo_completed(list_id, todo.todo_id, false)
            .await
            .unwrap();
        assert!(!undone.completed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_todo_completed_missing_todo() {
        let repository = repository_with(&["A"]).await;

        let result = repository
            .set_todo_completed(ListId::new(1), TodoId::new(5), true)
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::TodoNotFound {
                list_id: ListId::new(1),
                todo_id: TodoId::new(5),
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_groceries_scenario() {
        let repository = InMemoryListRepository::new();
        let list = repository.create_list("Groceries").await.unwrap();
        let milk = repository.create_todo(list.list_id, "Milk").await.unwrap();
        repository.create_todo(list.list_id, "Eggs").await.unwrap();

        repository
            .set_todo_completed(list.list_id, milk.todo_id, true)
            .await
            .unwrap();
        let completed = repository.complete_all(list.list_id).await.unwrap();

        assert_eq!(completed.todos.len(), 2);
        assert!(completed.todos.iter().all(|todo| todo.completed));
        assert!(completed.is_complete());
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_storage() {
        let repository = InMemoryListRepository::new();
        let clone = repository.clone();

        repository.create_list("Shared").await.unwrap();

        assert_eq!(clone.all_lists().await.unwrap().len(), 1);
    }
}
