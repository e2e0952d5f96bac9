//! Name validation for lists and todos.
//!
//! Names are measured in characters, not bytes, and must be between 1 and
//! [`NAME_MAX_LENGTH`] characters long. List names must also be distinct from
//! every other list name (exact, case-sensitive comparison).

use thiserror::Error;

/// Maximum number of characters in a list or todo name.
pub const NAME_MAX_LENGTH: usize = 100;

/// Reasons a submitted name is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// The name is empty or longer than [`NAME_MAX_LENGTH`] characters.
    #[error("name must be between 1 and {NAME_MAX_LENGTH} characters")]
    InvalidLength,

    /// Another list already uses this name.
    #[error("name is already in use")]
    DuplicateName,
}

fn has_valid_length(name: &str) -> bool {
    (1..=NAME_MAX_LENGTH).contains(&name.chars().count())
}

/// Validates a list name against the names of the other lists.
///
/// Callers renaming a list pass the names of every list except the one being
/// renamed, so keeping the current name is accepted.
///
/// # Errors
///
/// Returns `NameError::InvalidLength` before checking uniqueness, then
/// `NameError::DuplicateName` if any of `existing_names` equals `name`.
pub fn validate_list_name<'a>(
    name: &str,
    existing_names: impl IntoIterator<Item = &'a str>,
) -> Result<(), NameError> {
    if !has_valid_length(name) {
        return Err(NameError::InvalidLength);
    }

    if existing_names.into_iter().any(|existing| existing == name) {
        return Err(NameError::DuplicateName);
    }

    Ok(())
}

/// Validates a todo name.
///
/// # Errors
///
/// Returns `NameError::InvalidLength` if the name is empty or too long.
pub fn validate_todo_name(name: &str) -> Result<(), NameError> {
    if has_valid_length(name) {
        Ok(())
    } else {
        Err(NameError::InvalidLength)
    }
}
