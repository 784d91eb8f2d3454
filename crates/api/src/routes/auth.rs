//! Route definitions for the `/auth` resource.

use academia_core::roles::ROLE_NAMES;
use academia_core::validation::{Constraints, ValidationConfig};
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::middleware::validate::with_checks;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login    -> login
/// GET  /me       -> me (requires auth)
/// ```
pub fn router(validation: &ValidationConfig) -> Router<AppState> {
    let login_checks = vec![
        validation.validate_field("dni", "integer", "body", "mandatory", Constraints::none()),
        validation.validate_field("password", "string", "body", "mandatory", Constraints::none()),
        validation.validate_field(
            "rol",
            "string",
            "body",
            "optional",
            Constraints::allowed(ROLE_NAMES.iter().copied()),
        ),
    ];

    Router::new()
        .route("/login", with_checks(post(auth::login), login_checks))
        .route("/me", get(auth::me))
}
