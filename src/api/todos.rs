//! Todo page handlers.
//!
//! # Routes
//!
//! - `POST /lists/{id}/todos`: add a todo
//! - `POST /lists/{id}/todos/{todo_id}/delete`: delete a todo
//! - `POST /lists/{id}/todos/{todo_id}/check`: set a todo's completion
//! - `POST /lists/{id}/complete_all`: complete every todo of a list

use axum::Form;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};

use super::client::RequestOrigin;
use super::dto::{
    ALL_TODOS_COMPLETED, CompletionForm, INVALID_COMPLETION_STATE, TODO_ADDED, TODO_DELETED,
    TODO_UPDATED, TodoForm, todo_name_error_message,
};
use super::error::{OrPageError, PageError, PageResult};
use super::lists::{list_path, parse_list_id};
use crate::domain::TodoId;
use crate::infrastructure::{RepositoryError, Session};
use crate::view::list_page;

// =============================================================================
// POST /lists/{id}/todos
// =============================================================================

/// Adds a todo, or re-renders the list with the submitted text on a
/// validation failure.
pub async fn create_todo(
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<TodoForm>,
) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;

    match session.lists().create_todo(list_id, form.name()).await {
        Ok(todo) => {
            tracing::info!(list_id = %list_id, todo_id = %todo.todo_id, "Todo added");
            session.set_success(TODO_ADDED);
            Ok(Redirect::to(&list_path(list_id)).into_response())
        }
        Err(RepositoryError::InvalidName(error)) => {
            let list = session.lists().find_list(list_id).await.or_page_error(&session)?;
            session.set_error(todo_name_error_message(error));
            let page = list_page(&list, &form.todo, &session.take_flash());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(error) => Err(PageError::from_repository(&session, error)),
    }
}

// =============================================================================
// POST /lists/{id}/todos/{todo_id}/delete
// =============================================================================

/// Deletes a todo. Deleting an absent todo still succeeds.
///
/// Scripted clients get `204 No Content`; browsers get a flash message and a
/// redirect to the list.
pub async fn delete_todo(
    session: Session,
    origin: RequestOrigin,
    Path((id, todo_id)): Path<(String, String)>,
) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;

    match TodoId::parse(&todo_id) {
        Some(todo_id) => {
            let deleted = session
                .lists()
                .delete_todo(list_id, todo_id)
                .await
                .or_page_error(&session)?;
            tracing::info!(list_id = %list_id, todo_id = %todo_id, deleted, "Todo deleted");
        }
        None => {
            session.lists().find_list(list_id).await.or_page_error(&session)?;
        }
    }

    if origin.is_async() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    session.set_success(TODO_DELETED);
    Ok(Redirect::to(&list_path(list_id)).into_response())
}

// =============================================================================
// POST /lists/{id}/todos/{todo_id}/check
// =============================================================================

pub async fn check_todo(
    session: Session,
    Path((id, todo_id)): Path<(String, String)>,
    Form(form): Form<CompletionForm>,
) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;

    let Some(completed) = form.completed() else {
        session.lists().find_list(list_id).await.or_page_error(&session)?;
        session.set_error(INVALID_COMPLETION_STATE);
        return Ok(Redirect::to(&list_path(list_id)).into_response());
    };

    let Some(todo_id) = TodoId::parse(&todo_id) else {
        session.lists().find_list(list_id).await.or_page_error(&session)?;
        return Err(PageError::TodoNotFound { session, list_id });
    };

    session
        .lists()
        .set_todo_completed(list_id, todo_id, completed)
        .await
        .or_page_error(&session)?;
    tracing::info!(list_id = %list_id, todo_id = %todo_id, completed, "Todo updated");

    session.set_success(TODO_UPDATED);
    Ok(Redirect::to(&list_path(list_id)).into_response())
}

// =============================================================================
// POST /lists/{id}/complete_all
// =============================================================================

pub async fn complete_all(session: Session, Path(id): Path<String>) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;
    session.lists().complete_all(list_id).await.or_page_error(&session)?;
    tracing::info!(list_id = %list_id, "All todos completed");

    session.set_success(ALL_TODOS_COMPLETED);
    Ok(Redirect::to(&list_path(list_id)).into_response())
}
