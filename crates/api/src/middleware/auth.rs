//! JWT-based authentication extractor for Axum handlers.

use academia_core::error::CoreError;
use academia_core::roles::Role;
use academia_core::types::DocId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated account extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(account_id = %user.account_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The account's document id (from `claims.sub`).
    pub account_id: DocId,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let invalid = || AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()));

        let claims = validate_token(token, &state.config.jwt).map_err(|_| invalid())?;
        let account_id = DocId::parse(&claims.sub).ok_or_else(invalid)?;
        let role = Role::from_name(&claims.role).ok_or_else(invalid)?;

        Ok(AuthUser { account_id, role })
    }
}
