//! HTML rendering.
//!
//! Pages are plain functions from domain values to HTML strings; handlers
//! wrap the result in `axum::response::Html`.

pub mod display;
pub mod html;
pub mod pages;

pub use display::{list_class, sort_for_display, sorted_lists, sorted_todos, todo_class};
pub use html::escape;
pub use pages::{
    edit_list_page, internal_error_page, layout, list_page, lists_page, new_list_page,
    not_found_page,
};
