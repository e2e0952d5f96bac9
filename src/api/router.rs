//! Route table.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, index, not_found};
use super::lists::{create_list, delete_list, edit_list, list_lists, new_list, rename_list, show_list};
use super::session::SessionLayer;
use super::todos::{check_todo, complete_all, create_todo, delete_todo};
use crate::infrastructure::SessionStore;

/// Builds the application router over the given session store.
///
/// Only the list and todo pages resolve a session; `/`, `/health` and the
/// 404 fallback never issue a cookie.
pub fn build_router(sessions: SessionStore) -> Router {
    Router::new()
        // Lists
        .route("/lists", get(list_lists).post(create_list))
        .route("/lists/new", get(new_list))
        .route("/lists/{id}", get(show_list).post(rename_list))
        .route("/lists/{id}/edit", get(edit_list))
        .route("/lists/{id}/delete", post(delete_list))
        .route("/lists/{id}/complete_all", post(complete_all))
        // Todos
        .route("/lists/{id}/todos", post(create_todo))
        .route("/lists/{id}/todos/{todo_id}/delete", post(delete_todo))
        .route("/lists/{id}/todos/{todo_id}/check", post(check_todo))
        .route_layer(SessionLayer::new(sessions))
        .route("/", get(index))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}
