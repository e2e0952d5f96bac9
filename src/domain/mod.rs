//! Domain module for todo lists.
//!
//! This module contains the list and todo models, identifier assignment,
//! and name validation.

pub mod list;
pub mod validation;

pub use list::{ListId, Todo, TodoId, TodoList, next_id};
pub use validation::{NAME_MAX_LENGTH, NameError, validate_list_name, validate_todo_name};
