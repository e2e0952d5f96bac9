//! `PostgreSQL` repository implementation.
//!
//! This module provides a `PostgreSQL`-based implementation of `ListRepository`
//! using `sqlx`. Lists and todos live in two tables; a list is always loaded
//! together with its todos.
//!
//! # Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Each mutation runs in a single transaction, so a failure never leaves a
//!   partial update visible
//! - Identifier assignment with `COALESCE(MAX(id), 0) + 1` under a lock
//! - Every statement is logged at debug level
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS lists (
//!     id BIGINT PRIMARY KEY,
//!     name VARCHAR(100) NOT NULL UNIQUE
//! );
//!
//! CREATE TABLE IF NOT EXISTS todos (
//!     list_id BIGINT NOT NULL REFERENCES lists (id) ON DELETE CASCADE,
//!     id BIGINT NOT NULL,
//!     name VARCHAR(100) NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     PRIMARY KEY (list_id, id)
//! );
//! ```

use std::collections::BTreeMap;

use futures::FutureExt;
use sqlx::{PgConnection, PgPool};

use crate::domain::{
    ListId, NameError, Todo, TodoId, TodoList, validate_list_name, validate_todo_name,
};
use crate::infrastructure::{ListRepository, RepositoryError, RepositoryFuture};

// =============================================================================
// Schema
// =============================================================================

const CREATE_LISTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS lists (\
     id BIGINT PRIMARY KEY, \
     name VARCHAR(100) NOT NULL UNIQUE)";

const CREATE_TODOS_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (\
     list_id BIGINT NOT NULL REFERENCES lists (id) ON DELETE CASCADE, \
     id BIGINT NOT NULL, \
     name VARCHAR(100) NOT NULL, \
     completed BOOLEAN NOT NULL DEFAULT FALSE, \
     PRIMARY KEY (list_id, id))";

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

// =============================================================================
// Helper Functions
// =============================================================================

/// Logs a statement and its parameters before execution.
fn trace_statement(statement: &str, parameters: &dyn std::fmt::Debug) {
    tracing::debug!(statement, ?parameters, "Executing SQL");
}

/// Converts a `sqlx` error, mapping a unique violation on `lists.name` to a
/// duplicate-name rejection.
fn database_error(error: sqlx::Error) -> RepositoryError {
    let is_unique_violation = error
        .as_database_error()
        .and_then(|database_error| database_error.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);

    if is_unique_violation {
        RepositoryError::InvalidName(NameError::DuplicateName)
    } else {
        RepositoryError::DatabaseError(error.to_string())
    }
}

type ListRow = (i64, String);
type TodoRow = (i64, i64, String, bool);

fn todo_from_row((_, id, name, completed): TodoRow) -> Todo {
    Todo::new(TodoId::new(id), name).with_completed(completed)
}

/// Assembles lists from rows, attaching each todo to its parent.
///
/// Todo rows are expected in `(list_id, id)` order.
fn assemble_lists(list_rows: Vec<ListRow>, todo_rows: Vec<TodoRow>) -> Vec<TodoList> {
    let mut todos_by_list: BTreeMap<i64, Vec<Todo>> = BTreeMap::new();
    for row in todo_rows {
        todos_by_list.entry(row.0).or_default().push(todo_from_row(row));
    }

    list_rows
        .into_iter()
        .map(|(id, name)| {
            let todos = todos_by_list.remove(&id).unwrap_or_default();
            TodoList::new(ListId::new(id), name).with_todos(todos)
        })
        .collect()
}

/// Loads one list and its todos on the given connection.
async fn load_list(
    connection: &mut PgConnection,
    list_id: ListId,
) -> Result<TodoList, RepositoryError> {
    let statement = "SELECT id, name FROM lists WHERE id = $1";
    trace_statement(statement, &list_id);
    let list_row: Option<ListRow> = sqlx::query_as(statement)
        .bind(list_id.value())
        .fetch_optional(&mut *connection)
        .await
        .map_err(database_error)?;

    let list_row = list_row.ok_or(RepositoryError::ListNotFound(list_id))?;

    let statement = "SELECT list_id, id, name, completed FROM todos WHERE list_id = $1 ORDER BY id";
    trace_statement(statement, &list_id);
    let todo_rows: Vec<TodoRow> = sqlx::query_as(statement)
        .bind(list_id.value())
        .fetch_all(&mut *connection)
        .await
        .map_err(database_error)?;

    Ok(assemble_lists(vec![list_row], todo_rows)
        .pop()
        .unwrap_or_else(|| TodoList::new(list_id, String::new())))
}

/// Locks a list row for the rest of the transaction.
///
/// Fails with `ListNotFound` if the list does not exist.
async fn lock_list(connection: &mut PgConnection, list_id: ListId) -> Result<(), RepositoryError> {
    let statement = "SELECT id FROM lists WHERE id = $1 FOR UPDATE";
    trace_statement(statement, &list_id);
    let row: Option<(i64,)> = sqlx::query_as(statement)
        .bind(list_id.value())
        .fetch_optional(&mut *connection)
        .await
        .map_err(database_error)?;

    row.map(|_| ()).ok_or(RepositoryError::ListNotFound(list_id))
}

/// Names of other lists equal to `name`, excluding `excluded`.
async fn conflicting_names(
    connection: &mut PgConnection,
    name: &str,
    excluded: Option<ListId>,
) -> Result<Vec<String>, RepositoryError> {
    let statement = "SELECT name FROM lists WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)";
    trace_statement(statement, &(name, excluded));
    let rows: Vec<(String,)> = sqlx::query_as(statement)
        .bind(name)
        .bind(excluded.map(ListId::value))
        .fetch_all(&mut *connection)
        .await
        .map_err(database_error)?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

// =============================================================================
// PostgreSQL List Repository
// =============================================================================

/// `PostgreSQL` implementation of `ListRepository`.
///
/// Shared by every session: lists stored here are visible to all clients.
///
/// # Example
///
/// ```ignore
/// use todo_lists::infrastructure::{ListRepository, PostgresListRepository};
///
/// let pool = PgPool::connect("postgres://localhost/todos").await?;
/// let repository = PostgresListRepository::new(pool);
/// repository.ensure_schema().await?;
/// let list = repository.create_list("Groceries").await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresListRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresListRepository {
    /// Creates a new `PostgreSQL` list repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `lists` and `todos` tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in [CREATE_LISTS_TABLE, CREATE_TODOS_TABLE] {
            trace_statement(statement, &());
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
        }
        Ok(())
    }
}

impl ListRepository for PostgresListRepository {
    fn all_lists(&self) -> RepositoryFuture<Vec<TodoList>> {
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;

            // Both reads must see the same snapshot.
            let statement = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY";
            trace_statement(statement, &());
            sqlx::query(statement)
                .execute(&mut *transaction)
                .await
                .map_err(database_error)?;

            let statement = "SELECT id, name FROM lists ORDER BY id";
            trace_statement(statement, &());
            let list_rows: Vec<ListRow> = sqlx::query_as(statement)
                .fetch_all(&mut *transaction)
                .await
                .map_err(database_error)?;

            let statement = "SELECT list_id, id, name, completed FROM todos ORDER BY list_id, id";
            trace_statement(statement, &());
            let todo_rows: Vec<TodoRow> = sqlx::query_as(statement)
                .fetch_all(&mut *transaction)
                .await
                .map_err(database_error)?;

            transaction.commit().await.map_err(database_error)?;

            Ok(assemble_lists(list_rows, todo_rows))
        }
        .boxed()
    }

    fn find_list(&self, list_id: ListId) -> RepositoryFuture<TodoList> {
        let pool = self.pool.clone();
        async move {
            let mut connection = pool.acquire().await.map_err(database_error)?;
            load_list(&mut connection, list_id).await
        }
        .boxed()
    }

    fn create_list(&self, name: &str) -> RepositoryFuture<TodoList> {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;

            // Serializes id assignment and the uniqueness check across writers.
            let statement = "LOCK TABLE lists IN SHARE ROW EXCLUSIVE MODE";
            trace_statement(statement, &());
            sqlx::query(statement)
                .execute(&mut *transaction)
                .await
                .map_err(database_error)?;

            let conflicts = conflicting_names(&mut transaction, &name, None).await?;
            validate_list_name(&name, conflicts.iter().map(String::as_str))?;

            let statement = "INSERT INTO lists (id, name) \
                 SELECT COALESCE(MAX(id), 0) + 1, $1 FROM lists \
                 RETURNING id";
            trace_statement(statement, &name);
            let (id,): (i64,) = sqlx::query_as(statement)
                .bind(&name)
                .fetch_one(&mut *transaction)
                .await
                .map_err(database_error)?;

            transaction.commit().await.map_err(database_error)?;

            tracing::debug!(list_id = id, "List created");
            Ok(TodoList::new(ListId::new(id), name))
        }
        .boxed()
    }

    fn rename_list(&self, list_id: ListId, name: &str) -> RepositoryFuture<TodoList> {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;
            lock_list(&mut transaction, list_id).await?;

            let conflicts = conflicting_names(&mut transaction, &name, Some(list_id)).await?;
            validate_list_name(&name, conflicts.iter().map(String::as_str))?;

            let statement = "UPDATE lists SET name = $1 WHERE id = $2";
            trace_statement(statement, &(&name, list_id));
            sqlx::query(statement)
                .bind(&name)
                .bind(list_id.value())
                .execute(&mut *transaction)
                .await
                .map_err(database_error)?;

            let list = load_list(&mut transaction, list_id).await?;
            transaction.commit().await.map_err(database_error)?;

            tracing::debug!(%list_id, "List renamed");
            Ok(list)
        }
        .boxed()
    }

    fn delete_list(&self, list_id: ListId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        async move {
            let statement = "DELETE FROM lists WHERE id = $1";
            trace_statement(statement, &list_id);
            let result = sqlx::query(statement)
                .bind(list_id.value())
                .execute(&pool)
                .await
                .map_err(database_error)?;

            let deleted = result.rows_affected() > 0;
            tracing::debug!(%list_id, deleted, "List delete requested");
            Ok(deleted)
        }
        .boxed()
    }

    fn create_todo(&self, list_id: ListId, name: &str) -> RepositoryFuture<Todo> {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;
            lock_list(&mut transaction, list_id).await?;
            validate_todo_name(&name)?;

            let statement = "INSERT INTO todos (list_id, id, name, completed) \
                 SELECT $1, COALESCE(MAX(id), 0) + 1, $2, FALSE FROM todos WHERE list_id = $1 \
                 RETURNING list_id, id, name, completed";
            trace_statement(statement, &(list_id, &name));
            let row: TodoRow = sqlx::query_as(statement)
                .bind(list_id.value())
                .bind(&name)
                .fetch_one(&mut *transaction)
                .await
                .map_err(database_error)?;

            transaction.commit().await.map_err(database_error)?;

            let todo = todo_from_row(row);
            tracing::debug!(%list_id, todo_id = %todo.todo_id, "Todo created");
            Ok(todo)
        }
        .boxed()
    }

    fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;
            lock_list(&mut transaction, list_id).await?;

            let statement = "DELETE FROM todos WHERE list_id = $1 AND id = $2";
            trace_statement(statement, &(list_id, todo_id));
            let result = sqlx::query(statement)
                .bind(list_id.value())
                .bind(todo_id.value())
                .execute(&mut *transaction)
                .await
                .map_err(database_error)?;

            transaction.commit().await.map_err(database_error)?;

            let deleted = result.rows_affected() > 0;
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
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;
            lock_list(&mut transaction, list_id).await?;

            let statement = "UPDATE todos SET completed = $3 WHERE list_id = $1 AND id = $2 \
                 RETURNING list_id, id, name, completed";
            trace_statement(statement, &(list_id, todo_id, completed));
            let row: Option<TodoRow> = sqlx::query_as(statement)
                .bind(list_id.value())
                .bind(todo_id.value())
                .bind(completed)
                .fetch_optional(&mut *transaction)
                .await
                .map_err(database_error)?;

            let row = row.ok_or(RepositoryError::TodoNotFound { list_id, todo_id })?;
            transaction.commit().await.map_err(database_error)?;

            tracing::debug!(%list_id, %todo_id, completed, "Todo completion updated");
            Ok(todo_from_row(row))
        }
        .boxed()
    }

    fn complete_all(&self, list_id: ListId) -> RepositoryFuture<TodoList> {
        let pool = self.pool.clone();
        async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;
            lock_list(&mut transaction, list_id).await?;

            let statement = "UPDATE todos SET completed = TRUE WHERE list_id = $1";
            trace_statement(statement, &list_id);
            sqlx::query(statement)
                .bind(list_id.value())
                .execute(&mut *transaction)
                .await
                .map_err(database_error)?;

            let list = load_list(&mut transaction, list_id).await?;
            transaction.commit().await.map_err(database_error)?;

            tracing::debug!(%list_id, todo_count = list.todos.len(), "All todos completed");
            Ok(list)
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
    use rstest::rstest;

    // -------------------------------------------------------------------------
    // Row Assembly Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_assemble_lists_attaches_todos_to_parent() {
        let list_rows = vec![(1, "Groceries".to_string()), (2, "Work".to_string())];
        let todo_rows = vec![
            (1, 1, "Milk".to_string(), true),
            (1, 2, "Eggs".to_string(), false),
            (2, 1, "Report".to_string(), false),
        ];

        let lists = assemble_lists(list_rows, todo_rows);

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[0].todos.len(), 2);
        assert!(lists[0].todos[0].completed);
        assert_eq!(lists[1].todos.len(), 1);
        assert_eq!(lists[1].todos[0].todo_id, TodoId::new(1));
    }

    #[rstest]
    fn test_assemble_lists_without_todos() {
        let lists = assemble_lists(vec![(3, "Empty".to_string())], vec![]);

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].list_id, ListId::new(3));
        assert!(lists[0].todos.is_empty());
    }

    #[rstest]
    fn test_assemble_lists_ignores_orphan_todos() {
        let lists = assemble_lists(vec![], vec![(9, 1, "Orphan".to_string(), false)]);
        assert!(lists.is_empty());
    }

    // -------------------------------------------------------------------------
    // Integration Tests (require PostgreSQL)
    // -------------------------------------------------------------------------

    // These tests need a running PostgreSQL instance reachable through
    // DATABASE_URL; each one starts from empty tables.

    async fn fresh_repository() -> PostgresListRepository {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/todos_test".into());
        let pool = PgPool::connect(&database_url).await.unwrap();
        let repository = PostgresListRepository::new(pool);
        repository.ensure_schema().await.unwrap();
        sqlx::query("TRUNCATE lists CASCADE")
            .execute(repository.pool())
            .await
            .unwrap();
        repository
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_create_and_find_list_with_todos() {
        let repository = fresh_repository().await;

        let list = repository.create_list("Groceries").await.unwrap();
        repository.create_todo(list.list_id, "Milk").await.unwrap();
        repository.create_todo(list.list_id, "Eggs").await.unwrap();

        let found = repository.find_list(list.list_id).await.unwrap();
        assert_eq!(found.list_id, ListId::new(1));
        assert_eq!(found.todos.len(), 2);
        assert_eq!(found.todos[1].todo_id, TodoId::new(2));
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_duplicate_name_rejected() {
        let repository = fresh_repository().await;

        repository.create_list("A").await.unwrap();
        let result = repository.create_list("A").await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidName(NameError::DuplicateName))
        );
        assert_eq!(repository.all_lists().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_delete_cascades_to_todos() {
        let repository = fresh_repository().await;

        let list = repository.create_list("Temp").await.unwrap();
        repository.create_todo(list.list_id, "x").await.unwrap();
        assert!(repository.delete_list(list.list_id).await.unwrap());

        assert_eq!(
            repository.find_list(list.list_id).await,
            Err(RepositoryError::ListNotFound(list.list_id))
        );
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
            .fetch_one(repository.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_complete_all_and_missing_todo() {
        let repository = fresh_repository().await;

        let list = repository.create_list("Chores").await.unwrap();
        repository.create_todo(list.list_id, "Dishes").await.unwrap();
        repository.create_todo(list.list_id, "Laundry").await.unwrap();

        let completed = repository.complete_all(list.list_id).await.unwrap();
        assert!(completed.todos.iter().all(|todo| todo.completed));

        let missing = repository
            .set_todo_completed(list.list_id, TodoId::new(42), false)
            .await;
        assert_eq!(
            missing,
            Err(RepositoryError::TodoNotFound {
                list_id: list.list_id,
                todo_id: TodoId::new(42),
            })
        );
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_all_lists_groups_todos_by_list() {
        let repository = fresh_repository().await;

        let groceries = repository.create_list("Groceries").await.unwrap();
        let chores = repository.create_list("Chores").await.unwrap();
        repository.create_todo(groceries.list_id, "Milk").await.unwrap();
        repository.create_todo(chores.list_id, "Dishes").await.unwrap();
        repository.create_todo(groceries.list_id, "Bread").await.unwrap();

        let lists = repository.all_lists().await.unwrap();

        assert_eq!(lists.len(), 2);
        let names = |list: &TodoList| -> Vec<String> {
            list.todos.iter().map(|todo| todo.name.clone()).collect()
        };
        assert_eq!(lists[0].list_id, groceries.list_id);
        assert_eq!(names(&lists[0]), vec!["Milk", "Bread"]);
        assert_eq!(lists[1].list_id, chores.list_id);
        assert_eq!(names(&lists[1]), vec!["Dishes"]);
    }
}
