//! Route definitions for the CSV bulk importer.
//!
//! Mounted at `/import`.

use academia_core::import::kind::SELECTORS;
use academia_core::validation::{Constraints, ValidationConfig};
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::import;
use crate::middleware::validate::with_checks;
use crate::state::AppState;

/// Routes mounted at `/import`.
///
/// ```text
/// POST /{entidad}                  -> import_entities   (multipart)
/// POST /carreras/{codigo}/materias -> import_curriculum (multipart)
/// ```
///
/// The default body limit is lifted; the handlers enforce the configured
/// upload size while streaming the file.
pub fn router(validation: &ValidationConfig) -> Router<AppState> {
    let entity_checks = vec![validation.validate_field(
        "entidad",
        "string",
        "path",
        "mandatory",
        Constraints::allowed(SELECTORS.iter().copied()),
    )];
    let curriculum_checks = vec![validation.validate_field(
        "codigo",
        "integer",
        "path",
        "mandatory",
        Constraints::range(Some(1.0), None),
    )];

    Router::new()
        .route(
            "/{entidad}",
            with_checks(post(import::import_entities), entity_checks),
        )
        .route(
            "/carreras/{codigo}/materias",
            with_checks(post(import::import_curriculum), curriculum_checks),
        )
        .layer(DefaultBodyLimit::disable())
}
