//! Application configuration and service-level handlers.

use std::env;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};

use crate::infrastructure::{ConfigurationError, DEFAULT_SESSION_TTL};
use crate::view::not_found_page;

// =============================================================================
// Application Configuration
// =============================================================================

/// Runtime settings of the web application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// How long an idle session is kept.
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidSessionTtl` if `SESSION_TTL_SECONDS`
    /// is set but is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let raw = env::var("SESSION_TTL_SECONDS").ok();
        Ok(Self {
            session_ttl: parse_session_ttl(raw.as_deref())?,
        })
    }
}

/// Parses `SESSION_TTL_SECONDS`; unset or blank means the default.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidSessionTtl` for zero or non-numeric values.
pub fn parse_session_ttl(value: Option<&str>) -> Result<Duration, ConfigurationError> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_SESSION_TTL);
    };

    match trimmed.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigurationError::InvalidSessionTtl(trimmed.to_string())),
    }
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// # Response
///
/// - **200 OK**: Service is healthy
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Entry Point and Fallback
// =============================================================================

/// `GET /` sends the browser to the list index.
pub async fn index() -> Redirect {
    Redirect::to("/lists")
}

/// Responds to unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(not_found_page()))
}

// =============================================================================
// Tests
// =============================================================================
