//! Infrastructure module for storage and sessions.
//!
//! This module contains the list repositories, the factory that selects a
//! backend at startup, and the server-side session store.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;
pub mod session;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryListRepository;
pub use postgres::PostgresListRepository;
pub use repository::{ListRepository, RepositoryError, RepositoryFuture};
pub use session::{DEFAULT_SESSION_TTL, Flash, ListStorage, Session, SessionId, SessionStore};
