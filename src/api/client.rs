//! Request origin detection.
//!
//! Scripted clients send `X-Requested-With: XMLHttpRequest` and get a
//! machine-readable answer from the delete endpoints instead of a redirect.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::HeaderName;
use axum::http::request::Parts;

/// Header set by scripted clients.
pub static REQUESTED_WITH_HEADER: HeaderName = HeaderName::from_static("x-requested-with");

const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Who sent the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// A browser navigation or plain form submission.
    Browser,
    /// A script expecting a machine-readable response.
    Async,
}

impl RequestOrigin {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_async = headers
            .get(&REQUESTED_WITH_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim() == XML_HTTP_REQUEST);

        if is_async { Self::Async } else { Self::Browser }
    }

    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }
}

impl<State> FromRequestParts<State> for RequestOrigin
where
    State: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &State,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
