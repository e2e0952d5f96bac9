//! Page error handling.
//!
//! Store failures surface to the browser either as a flash message plus a
//! redirect (missing list or todo) or as a 500 page (database failure).

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::dto::{LIST_NOT_FOUND, TODO_NOT_FOUND};
use crate::domain::ListId;
use crate::infrastructure::{RepositoryError, Session};
use crate::view::internal_error_page;

// =============================================================================
// Page Error
// =============================================================================

/// Error returned by page handlers.
#[derive(Debug)]
pub enum PageError {
    /// The list is unknown to this session.
    ListNotFound(Session),
    /// The list exists but the todo does not.
    TodoNotFound { session: Session, list_id: ListId },
    /// The request could not be served.
    Internal(String),
}

/// Result type of page handlers.
pub type PageResult = Result<Response, PageError>;

impl PageError {
    /// Maps a repository error for the given session.
    #[must_use]
    pub fn from_repository(session: &Session, error: RepositoryError) -> Self {
        match error {
            RepositoryError::ListNotFound(_) => Self::ListNotFound(session.clone()),
            RepositoryError::TodoNotFound { list_id, .. } => Self::TodoNotFound {
                session: session.clone(),
                list_id,
            },
            RepositoryError::InvalidName(_) | RepositoryError::DatabaseError(_) => {
                Self::Internal(error.to_string())
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::ListNotFound(session) => {
                session.set_error(LIST_NOT_FOUND);
                Redirect::to("/lists").into_response()
            }
            Self::TodoNotFound { session, list_id } => {
                session.set_error(TODO_NOT_FOUND);
                Redirect::to(&format!("/lists/{list_id}")).into_response()
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(internal_error_page())).into_response()
            }
        }
    }
}

/// Attaches the session to repository errors so they can become pages.
pub trait OrPageError<T> {
    /// Converts the error side into a [`PageError`].
    ///
    /// # Errors
    ///
    /// Returns the mapped error if `self` is an error.
    fn or_page_error(self, session: &Session) -> Result<T, PageError>;
}

impl<T> OrPageError<T> for Result<T, RepositoryError> {
    fn or_page_error(self, session: &Session) -> Result<T, PageError> {
        self.map_err(|error| PageError::from_repository(session, error))
    }
}

// =============================================================================
// Tests
// =============================================================================
