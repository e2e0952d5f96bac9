//! Todo Lists Web Application Library
//!
//! Session-scoped todo lists served as HTML pages. Lists and their todos
//! live either in a per-session in-memory store or in a shared `PostgreSQL`
//! database, selected at startup.
//!
//! - [`domain`]: lists, todos, and name validation
//! - [`infrastructure`]: repositories, configuration, and sessions
//! - [`view`]: HTML rendering
//! - [`api`]: routes, middleware, and handlers

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod view;
