use academia_core::error::CoreError;
use academia_core::import::ImportError;
use academia_core::store::StoreError;
use academia_core::validation::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of `academia_core` and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce the uniform envelope:
///
/// ```text
/// { "status": "error",
///   "error": { "code": <http status>, "id": "<slug>", "message": "...", "row": <n>? } }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `academia_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request input failed a declared check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An import run did not complete.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The document store failed outside an import run.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The uploaded file exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Parts of an error response before serialisation.
struct ErrorBody {
    status: StatusCode,
    id: &'static str,
    message: String,
    row: Option<usize>,
}

impl ErrorBody {
    fn new(status: StatusCode, id: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            id,
            message: message.into(),
            row: None,
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorBody::new(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    ErrorBody::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    ErrorBody::new(StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    ErrorBody::new(StatusCode::FORBIDDEN, "forbidden", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorBody::internal()
                }
            },

            // --- Request validation ---
            AppError::Validation(err) => {
                if matches!(err, ValidationError::Configuration { .. }) {
                    tracing::error!(error = %err, "Misconfigured input check");
                }
                ErrorBody::new(StatusCode::UNPROCESSABLE_ENTITY, err.id(), err.to_string())
            }

            // --- Import runs ---
            AppError::Import(err) => classify_import_error(err),

            AppError::Store(err) => {
                tracing::error!(error = %err, "Document store error");
                ErrorBody::internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::PayloadTooLarge(msg) => {
                ErrorBody::new(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        };

        let mut error = json!({
            "code": body.status.as_u16(),
            "id": body.id,
            "message": body.message,
        });
        if let Some(row) = body.row {
            error["row"] = json!(row);
        }

        (body.status, axum::Json(json!({ "status": "error", "error": error }))).into_response()
    }
}

/// Row, parse and reference failures are the uploader's to fix (422);
/// everything else is a server-side failure with a sanitised message.
fn classify_import_error(err: &ImportError) -> ErrorBody {
    match err {
        ImportError::Row { row, .. } => ErrorBody {
            row: Some(*row),
            ..ErrorBody::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "row_validation_error",
                err.to_string(),
            )
        },
        ImportError::Parse(_) => {
            ErrorBody::new(StatusCode::UNPROCESSABLE_ENTITY, "parse_error", err.to_string())
        }
        ImportError::Reference(_) => {
            ErrorBody::new(StatusCode::UNPROCESSABLE_ENTITY, "reference_error", err.to_string())
        }
        ImportError::Lookup(_)
        | ImportError::Commit(_)
        | ImportError::Io(_)
        | ImportError::Internal(_) => {
            tracing::error!(error = %err, "Import failed");
            ErrorBody::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "import_error",
                "The import could not be completed",
            )
        }
    }
}
