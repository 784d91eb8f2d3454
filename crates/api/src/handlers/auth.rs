//! Handlers for the `/auth` resource (login, current account).

use academia_core::error::CoreError;
use academia_core::password::verify_password;
use academia_core::roles::Role;
use academia_core::store::{document_id, Document, Filter, ID_FIELD};
use academia_core::types::DocId;
use academia_core::validation::primitives::as_integer;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Field holding the account's Argon2id password hash.
const PASSWORD_FIELD: &str = "password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
///
/// `dni` arrives as a number or as numeric text; the input checks on the
/// route have already verified it is an integer.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub dni: Value,
    pub password: String,
    /// Role to sign in as; defaults to `alumno`.
    pub rol: Option<String>,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: AccountInfo,
}

/// Public account info.
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub id: DocId,
    pub rol: Role,
    pub dni: Option<i64>,
    pub nombres: Option<String>,
    pub apellidos: Option<String>,
}

impl AccountInfo {
    fn from_document(id: DocId, role: Role, account: &Document) -> Self {
        let text = |field: &str| account.get(field).and_then(Value::as_str).map(str::to_string);
        Self {
            id,
            rol: role,
            dni: account.get("dni").and_then(as_integer),
            nombres: text("nombres"),
            apellidos: text("apellidos"),
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid DNI or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with DNI + password against the accounts of the requested
/// role. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let dni = as_integer(&input.dni).ok_or_else(invalid_credentials)?;
    let role = match input.rol.as_deref() {
        Some(name) => Role::from_name(name).ok_or_else(invalid_credentials)?,
        None => Role::Student,
    };

    // 1. Find the account by DNI in the role's collection.
    let account = state
        .store
        .find_one(role.accounts(), &Filter::new().eq("dni", dni))
        .await?
        .ok_or_else(invalid_credentials)?;
    let id = document_id(&account).ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!(
            "{} account with DNI {dni} has no valid id",
            role
        )))
    })?;

    // 2. Verify password.
    let hash = account
        .get(PASSWORD_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(invalid_credentials)?;
    let password_valid = verify_password(&input.password, hash).map_err(|e| {
        AppError::Core(CoreError::Internal(format!(
            "Unreadable password hash for account {id}: {e}"
        )))
    })?;
    if !password_valid {
        tracing::info!(dni, role = %role, "Login rejected");
        return Err(invalid_credentials());
    }

    // 3. Issue the access token.
    let access_token = generate_access_token(&id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    tracing::info!(account_id = %id, role = %role, "Login succeeded");

    Ok(Json(DataResponse::success(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: AccountInfo::from_document(id, role, &account),
    })))
}

/// GET /api/v1/auth/me
///
/// Return the account behind the bearer token.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<AccountInfo>>> {
    let account = state
        .store
        .find_one(
            user.role.accounts(),
            &Filter::new().eq(ID_FIELD, user.account_id.as_str()),
        )
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "account",
                id: user.account_id.to_string(),
            })
        })?;

    Ok(Json(DataResponse::success(AccountInfo::from_document(
        user.account_id,
        user.role,
        &account,
    ))))
}
