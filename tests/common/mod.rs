//! Common test helpers for router-level integration tests.
//!
//! `TestClient` drives the router with `tower::ServiceExt::oneshot` and keeps
//! the session cookie between requests, the way a browser would.
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_lists::api::build_router;
use todo_lists::infrastructure::SessionStore;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Creates a router whose sessions each keep their lists in memory.
pub fn create_test_router() -> Router {
    build_router(SessionStore::per_session(Duration::from_secs(3600)))
}

/// Encodes form fields as `application/x-www-form-urlencoded`.
pub fn form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            b' ' => "+".to_string(),
            other => format!("%{other:02X}"),
        })
        .collect()
}

// =============================================================================
// Test Response
// =============================================================================

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Asserts a `303 See Other` to `path`.
    pub fn assert_redirect(&self, path: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(path));
    }
}

// =============================================================================
// Test Client
// =============================================================================

/// One browser: a router plus the session cookie it was given.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    /// A second client on the same router, without the session cookie.
    pub fn other_browser(&self) -> Self {
        Self::new(self.router.clone())
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::builder().method("GET").uri(path);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE);
        self.send(request, Body::from(form(fields))).await
    }

    pub async fn post_async(&mut self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("X-Requested-With", "XMLHttpRequest");
        self.send(request, Body::empty()).await
    }

    async fn send(&mut self, request: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie.as_str()),
            None => request,
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());

        if let Some(cookie) = &set_cookie {
            let pair = cookie.split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        TestResponse {
            status,
            location,
            set_cookie,
            body,
        }
    }

    /// Creates a list and returns the path of its detail page.
    pub async fn create_list(&mut self, name: &str) -> String {
        self.post_form("/lists", &[("list_name", name)])
            .await
            .assert_redirect("/lists");
        let index = self.get("/lists").await;

        let marker = format!("<h3>{}</h3>", name.trim());
        let end = index.body.find(&marker).expect("list is not on the index");
        let start = index.body[..end].rfind("href=\"").expect("list has no link") + 6;
        let close = start + index.body[start..].find('"').unwrap();
        index.body[start..close].to_string()
    }
}
