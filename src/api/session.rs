//! Session cookie middleware.
//!
//! `SessionLayer` resolves the client's session from the `todo_session`
//! cookie before the handler runs and puts it in the request extensions.
//! When a new session had to be started, the response carries a
//! `Set-Cookie` header for it.

use std::task::{Context, Poll};

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use crate::infrastructure::{Session, SessionId, SessionStore};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "todo_session";

/// Reads the session id from the `Cookie` headers, if one is present and well formed.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

/// Builds the `Set-Cookie` value for a session.
#[must_use]
pub fn session_cookie(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

// =============================================================================
// Session Extractor
// =============================================================================

impl<State> FromRequestParts<State> for Session
where
    State: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &State,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session not found. Ensure SessionLayer is applied.",
        ))
    }
}

// =============================================================================
// SessionLayer
// =============================================================================

#[derive(Debug, Clone)]
pub struct SessionLayer {
    store: SessionStore,
}

impl SessionLayer {
    #[must_use]
    pub const fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

impl<Inner> Layer<Inner> for SessionLayer {
    type Service = SessionService<Inner>;

    fn layer(&self, inner: Inner) -> Self::Service {
        SessionService {
            inner,
            store: self.store.clone(),
        }
    }
}

// =============================================================================
// SessionService
// =============================================================================

#[derive(Debug, Clone)]
pub struct SessionService<Inner> {
    inner: Inner,
    store: SessionStore,
}

impl<Inner, RequestBody, ResponseBody> Service<Request<RequestBody>> for SessionService<Inner>
where
    Inner: Service<Request<RequestBody>, Response = Response<ResponseBody>> + Clone + Send + 'static,
    Inner::Future: Send,
    RequestBody: Send + 'static,
    ResponseBody: Send + 'static,
{
    type Response = Response<ResponseBody>;
    type Error = Inner::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, context: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(context)
    }

    fn call(&mut self, mut request: Request<RequestBody>) -> Self::Future {
        let presented = session_id_from_headers(request.headers());
        let store = self.store.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (session, issued) = store.resolve(presented).await;
            let session_id = session.id();
            request.extensions_mut().insert(session);

            let mut response = inner.call(request).await?;

            if issued {
                match HeaderValue::from_str(&session_cookie(session_id)) {
                    Ok(value) => {
                        response.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(error) => tracing::warn!(%error, "Could not encode session cookie"),
                }
            }

            Ok(response)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
