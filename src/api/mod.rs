//! API module for HTTP handlers.
//!
//! This module contains route definitions, the session middleware, and the
//! page handlers for lists and todos.

pub mod client;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod lists;
pub mod router;
pub mod session;
pub mod todos;

pub use client::RequestOrigin;
pub use error::{OrPageError, PageError, PageResult};
pub use handlers::{AppConfig, HealthResponse, health_check, index, not_found};
pub use lists::{create_list, delete_list, edit_list, list_lists, new_list, rename_list, show_list};
pub use router::build_router;
pub use session::{SESSION_COOKIE, SessionLayer, SessionService};
pub use todos::{check_todo, complete_all, create_todo, delete_todo};
