//! Form payloads and user-facing messages.
//!
//! Submitted names are trimmed before validation and storage.

use serde::Deserialize;

use crate::domain::NameError;

// =============================================================================
// Forms
// =============================================================================

/// Body of `POST /lists` and `POST /lists/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNameForm {
    #[serde(default)]
    pub list_name: String,
}

impl ListNameForm {
    /// The submitted list name without surrounding whitespace.
    #[must_use]
    pub fn name(&self) -> &str {
        self.list_name.trim()
    }
}

/// Body of `POST /lists/{id}/todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub todo: String,
}

impl TodoForm {
    /// The submitted todo name without surrounding whitespace.
    #[must_use]
    pub fn name(&self) -> &str {
        self.todo.trim()
    }
}

/// Body of `POST /lists/{id}/todos/{todo_id}/check`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionForm {
    #[serde(default)]
    pub completed: String,
}

impl CompletionForm {
    /// Parses the requested completion state.
    ///
    /// Only `"true"` and `"false"` are accepted.
    #[must_use]
    pub fn completed(&self) -> Option<bool> {
        match self.completed.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

pub const LIST_CREATED: &str = "The list has been created.";
pub const LIST_UPDATED: &str = "The list has been updated.";
pub const LIST_DELETED: &str = "The list has been deleted.";
pub const TODO_ADDED: &str = "The todo was added.";
pub const TODO_DELETED: &str = "The todo has been deleted.";
pub const TODO_UPDATED: &str = "The todo has been updated.";
pub const ALL_TODOS_COMPLETED: &str = "All todos have been completed.";

pub const LIST_NOT_FOUND: &str = "The specified list was not found.";
pub const TODO_NOT_FOUND: &str = "The specified todo was not found.";
pub const INVALID_COMPLETION_STATE: &str = "Invalid completion state.";

/// Error message shown for a rejected list name.
#[must_use]
pub const fn list_name_error_message(error: NameError) -> &'static str {
    match error {
        NameError::InvalidLength => "List name must be between 1 and 100 characters.",
        NameError::DuplicateName => "List name must be unique.",
    }
}

/// Error message shown for a rejected todo name.
#[must_use]
pub const fn todo_name_error_message(error: NameError) -> &'static str {
    match error {
        NameError::InvalidLength | NameError::DuplicateName => {
            "Todo must be between 1 and 100 characters."
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
