//! List page handlers.
//!
//! # Routes
//!
//! - `GET /lists`: list index
//! - `POST /lists`: create a list
//! - `GET /lists/new`: new-list form
//! - `GET /lists/{id}`: list detail
//! - `GET /lists/{id}/edit`: rename form
//! - `POST /lists/{id}`: rename a list
//! - `POST /lists/{id}/delete`: delete a list

use axum::Form;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};

use super::client::RequestOrigin;
use super::dto::{LIST_CREATED, LIST_DELETED, LIST_UPDATED, ListNameForm, list_name_error_message};
use super::error::{OrPageError, PageError, PageResult};
use crate::domain::ListId;
use crate::infrastructure::{RepositoryError, Session};
use crate::view::{edit_list_page, list_page, lists_page, new_list_page};

/// Parses a list id from the path; anything unparseable is an unknown list.
pub(crate) fn parse_list_id(session: &Session, raw: &str) -> Result<ListId, PageError> {
    ListId::parse(raw).ok_or_else(|| PageError::ListNotFound(session.clone()))
}

pub(crate) fn list_path(list_id: ListId) -> String {
    format!("/lists/{list_id}")
}

// =============================================================================
// GET /lists
// =============================================================================

pub async fn list_lists(session: Session) -> PageResult {
    let lists = session.lists().all_lists().await.or_page_error(&session)?;
    Ok(Html(lists_page(&lists, &session.take_flash())).into_response())
}

// =============================================================================
// GET /lists/new, POST /lists
// =============================================================================

pub async fn new_list(session: Session) -> Html<String> {
    Html(new_list_page("", &session.take_flash()))
}

/// Creates a list, or re-renders the form with the submitted name on a
/// validation failure.
pub async fn create_list(session: Session, Form(form): Form<ListNameForm>) -> PageResult {
    match session.lists().create_list(form.name()).await {
        Ok(list) => {
            tracing::info!(list_id = %list.list_id, "List created");
            session.set_success(LIST_CREATED);
            Ok(Redirect::to("/lists").into_response())
        }
        Err(RepositoryError::InvalidName(error)) => {
            session.set_error(list_name_error_message(error));
            let page = new_list_page(&form.list_name, &session.take_flash());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(error) => Err(PageError::from_repository(&session, error)),
    }
}

// =============================================================================
// GET /lists/{id}, GET /lists/{id}/edit
// =============================================================================

pub async fn show_list(session: Session, Path(id): Path<String>) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;
    let list = session.lists().find_list(list_id).await.or_page_error(&session)?;
    Ok(Html(list_page(&list, "", &session.take_flash())).into_response())
}

pub async fn edit_list(session: Session, Path(id): Path<String>) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;
    let list = session.lists().find_list(list_id).await.or_page_error(&session)?;
    Ok(Html(edit_list_page(&list, &list.name, &session.take_flash())).into_response())
}

// =============================================================================
// POST /lists/{id}
// =============================================================================

pub async fn rename_list(
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ListNameForm>,
) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;

    match session.lists().rename_list(list_id, form.name()).await {
        Ok(_) => {
            tracing::info!(list_id = %list_id, "List renamed");
            session.set_success(LIST_UPDATED);
            Ok(Redirect::to(&list_path(list_id)).into_response())
        }
        Err(RepositoryError::InvalidName(error)) => {
            let list = session.lists().find_list(list_id).await.or_page_error(&session)?;
            session.set_error(list_name_error_message(error));
            let page = edit_list_page(&list, &form.list_name, &session.take_flash());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(error) => Err(PageError::from_repository(&session, error)),
    }
}

// =============================================================================
// POST /lists/{id}/delete
// =============================================================================

/// Deletes a list. Deleting an absent list still succeeds.
///
/// Scripted clients get `200` with the path to navigate to; browsers get a
/// flash message and a redirect.
pub async fn delete_list(
    session: Session,
    origin: RequestOrigin,
    Path(id): Path<String>,
) -> PageResult {
    let list_id = parse_list_id(&session, &id)?;
    let deleted = session.lists().delete_list(list_id).await.or_page_error(&session)?;
    tracing::info!(list_id = %list_id, deleted, "List deleted");

    if origin.is_async() {
        return Ok((StatusCode::OK, "/lists").into_response());
    }

    session.set_success(LIST_DELETED);
    Ok(Redirect::to("/lists").into_response())
}
