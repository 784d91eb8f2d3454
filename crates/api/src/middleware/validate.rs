//! Request-input validation middleware.
//!
//! Routes attach declared [`InputCheck`]s with [`with_checks`]. Before the
//! handler runs, the middleware snapshots headers, the JSON body, the query
//! string and the matched path parameters into [`RequestInputs`] and runs
//! the checks in order. The first failure short-circuits with a 422.

use std::collections::HashMap;
use std::sync::Arc;

use academia_core::validation::{run_checks, InputCheck, InputSource, RequestInputs};
use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, Query, RawPathParams, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Largest JSON body buffered for validation.
const MAX_JSON_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Run `checks` before every handler of `route`.
pub fn with_checks(
    route: MethodRouter<AppState>,
    checks: Vec<InputCheck>,
) -> MethodRouter<AppState> {
    let checks: Arc<[InputCheck]> = checks.into();
    route.route_layer(from_fn_with_state(checks, validate_request))
}

async fn validate_request(
    State(checks): State<Arc<[InputCheck]>>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let (mut parts, body) = request.into_parts();
    let mut inputs = RequestInputs::new();

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            inputs.insert_header(name.as_str(), value);
        }
    }

    if let Ok(Query(query)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        for (name, value) in query {
            inputs = inputs.with_query(name, value);
        }
    }

    if let Ok(params) = RawPathParams::from_request_parts(&mut parts, &()).await {
        for (name, value) in &params {
            inputs = inputs.with_path_param(name, value);
        }
    }

    let body = if reads_body(&checks) && is_json(&parts) {
        let bytes = to_bytes(body, MAX_JSON_BODY_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {e}")))?;
        if !bytes.is_empty() {
            let json = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {e}")))?;
            inputs = inputs.with_body(json);
        }
        Body::from(bytes)
    } else {
        body
    };

    if let Err(err) = run_checks(&checks, &inputs) {
        tracing::debug!(
            method = %parts.method,
            path = %parts.uri.path(),
            field = err.field(),
            error = %err,
            "Request rejected by input checks"
        );
        return Err(err.into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Misconfigured checks report no source, so they also force a body read;
/// the failure they carry is reported either way.
fn reads_body(checks: &[InputCheck]) -> bool {
    checks
        .iter()
        .any(|check| matches!(check.source(), Some(InputSource::Body) | None))
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
