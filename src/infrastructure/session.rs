//! Server-side session store.
//!
//! Each client session owns a handle to its list storage and the one-shot
//! flash messages shown on the next rendered page. Sessions are created on
//! first access and discarded once idle for longer than the configured TTL.
//!
//! With [`ListStorage::PerSession`] every session gets its own
//! [`InMemoryListRepository`], so lists are private to one client. With
//! [`ListStorage::Shared`] all sessions use the same backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::{InMemoryListRepository, ListRepository};

// =============================================================================
// Session Id
// =============================================================================

/// Opaque identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a new random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a session id from a cookie value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Flash Messages
// =============================================================================

/// One-shot status messages for the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    /// Confirmation of a completed action.
    pub success: Option<String>,
    /// Description of a rejected action.
    pub error: Option<String>,
}

impl Flash {
    /// Returns true if there is nothing to display.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }
}

// =============================================================================
// List Storage
// =============================================================================

/// Where sessions keep their lists.
#[derive(Clone)]
pub enum ListStorage {
    /// A fresh in-memory repository per session.
    PerSession,
    /// One backend shared by every session.
    Shared(Arc<dyn ListRepository>),
}

impl ListStorage {
    fn repository_for_new_session(&self) -> Arc<dyn ListRepository> {
        match self {
            Self::PerSession => Arc::new(InMemoryListRepository::new()),
            Self::Shared(repository) => Arc::clone(repository),
        }
    }
}

impl std::fmt::Debug for ListStorage {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerSession => formatter.write_str("PerSession"),
            Self::Shared(_) => formatter.write_str("Shared(Arc<dyn ListRepository>)"),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Handle to one client's session, passed to handlers.
///
/// Clones refer to the same session state.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    lists: Arc<dyn ListRepository>,
    flash: Arc<Mutex<Flash>>,
}

impl Session {
    /// The session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The list storage of this session.
    #[must_use]
    pub fn lists(&self) -> &dyn ListRepository {
        self.lists.as_ref()
    }

    /// Sets the success message for the next page.
    pub fn set_success(&self, message: impl Into<String>) {
        self.flash.lock().success = Some(message.into());
    }

    /// Sets the error message for the next page.
    pub fn set_error(&self, message: impl Into<String>) {
        self.flash.lock().error = Some(message.into());
    }

    /// Removes and returns the pending flash messages.
    #[must_use]
    pub fn take_flash(&self) -> Flash {
        std::mem::take(&mut *self.flash.lock())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Session")
            .field("id", &self.id)
            .field("lists", &"Arc<dyn ListRepository>")
            .field("flash", &*self.flash.lock())
            .finish()
    }
}

// =============================================================================
// Session Store
// =============================================================================

struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

/// Table of live sessions.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    storage: ListStorage,
    ttl: Duration,
}

/// Default idle lifetime of a session (one day).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(storage: ListStorage, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            storage,
            ttl,
        }
    }

    /// Creates a store whose sessions each keep their lists in memory.
    #[must_use]
    pub fn per_session(ttl: Duration) -> Self {
        Self::new(ListStorage::PerSession, ttl)
    }

    /// Resolves the session for a request.
    ///
    /// Returns the live session for `presented` if there is one and refreshes
    /// its idle timer. Otherwise starts a new session; the boolean is `true`
    /// when a new session was issued and the client needs a cookie for it.
    pub async fn resolve(&self, presented: Option<SessionId>) -> (Session, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = presented {
            let expired = match sessions.get_mut(&id) {
                Some(entry) if now.duration_since(entry.last_seen) <= self.ttl => {
                    entry.last_seen = now;
                    return (entry.session.clone(), false);
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                sessions.remove(&id);
                tracing::debug!(session_id = %id, "Session expired");
            }
        }

        let ttl = self.ttl;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= ttl);

        let session = Session {
            id: SessionId::generate(),
            lists: self.storage.repository_for_new_session(),
            flash: Arc::new(Mutex::new(Flash::default())),
        };
        sessions.insert(
            session.id,
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        drop(sessions);

        tracing::debug!(session_id = %session.id, "Session started");
        (session, true)
    }

    /// Number of sessions currently held, including idle ones not yet purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no sessions are held.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionStore")
            .field("storage", &self.storage)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TTL: Duration = Duration::from_secs(60);

    #[rstest]
    fn test_session_id_parse_round_trip() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_without_cookie_issues_session() {
        let store = SessionStore::per_session(TTL);

        let (_, issued) = store.resolve(None).await;

        assert!(issued);
        assert_eq!(store.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_known_session_reuses_it() {
        let store = SessionStore::per_session(TTL);
        let (session, _) = store.resolve(None).await;

        let (again, issued) = store.resolve(Some(session.id())).await;

        assert!(!issued);
        assert_eq!(again.id(), session.id());
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_unknown_session_issues_new_one() {
        let store = SessionStore::per_session(TTL);
        let unknown = SessionId::generate();

        let (session, issued) = store.resolve(Some(unknown)).await;

        assert!(issued);
        assert_ne!(session.id(), unknown);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let store = SessionStore::per_session(TTL);
        let (session, _) = store.resolve(None).await;
        session.lists().create_list("Groceries").await.unwrap();

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        let (renewed, issued) = store.resolve(Some(session.id())).await;

        assert!(issued);
        assert_ne!(renewed.id(), session.id());
        assert!(renewed.lists().all_lists().await.unwrap().is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_activity_refreshes_idle_timer() {
        let store = SessionStore::per_session(TTL);
        let (session, _) = store.resolve(None).await;

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        store.resolve(Some(session.id())).await;
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        let (_, issued) = store.resolve(Some(session.id())).await;

        assert!(!issued);
    }

    #[rstest]
    #[tokio::test]
    async fn test_per_session_storage_is_isolated() {
        let store = SessionStore::per_session(TTL);
        let (first, _) = store.resolve(None).await;
        let (second, _) = store.resolve(None).await;

        first.lists().create_list("Private").await.unwrap();

        assert_eq!(first.lists().all_lists().await.unwrap().len(), 1);
        assert!(second.lists().all_lists().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_shared_storage_is_visible_to_all_sessions() {
        let shared: Arc<dyn ListRepository> = Arc::new(InMemoryListRepository::new());
        let store = SessionStore::new(ListStorage::Shared(shared), TTL);
        let (first, _) = store.resolve(None).await;
        let (second, _) = store.resolve(None).await;

        first.lists().create_list("Team").await.unwrap();

        assert_eq!(second.lists().all_lists().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let store = SessionStore::per_session(TTL);
        let (session, _) = store.resolve(None).await;

        session.set_success("The list has been created.");
        let (same, _) = store.resolve(Some(session.id())).await;

        let flash = same.take_flash();
        assert_eq!(flash.success.as_deref(), Some("The list has been created."));
        assert!(flash.error.is_none());
        assert!(same.take_flash().is_empty());
    }
}
