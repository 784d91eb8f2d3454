pub mod auth;
pub mod health;
pub mod import;

use std::time::Duration;

use academia_core::validation::ValidationConfig;
use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/me                                         current account (requires auth)
///
/// /import/{entidad}                                CSV entity import (admin only)
/// /import/carreras/{codigo}/materias               CSV curriculum import (admin only)
/// ```
///
/// Input checks are declared per route against `validation`. Imports run
/// under `import_timeout_secs`; everything else under `request_timeout_secs`.
pub fn api_routes(validation: &ValidationConfig, config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest(
            "/auth",
            auth::router(validation).layer(timeout(config.request_timeout_secs)),
        )
        .nest(
            "/import",
            import::router(validation).layer(timeout(config.import_timeout_secs)),
        )
}

/// Respond `408 Request Timeout` when a request runs longer than `secs`.
pub fn timeout(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}
