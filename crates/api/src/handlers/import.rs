//! Handlers for the CSV bulk importer.
//!
//! Uploads are staged as temporary files under the configured upload
//! directory and imported from there. The staged file is deleted when the
//! request ends, including when it times out or the client goes away.

use std::path::Path as FsPath;

use academia_core::error::CoreError;
use academia_core::import::{import_file, ImportKind};
use academia_core::validation::primitives::parse_integer;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the CSV file.
const FILE_FIELD: &str = "file";

/// Typed response for a completed import.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    #[serde(rename = "cantidadRegistrosProcesados")]
    pub processed: usize,
}

// ── Entity import ────────────────────────────────────────────────────

/// POST /api/v1/import/{entidad}
///
/// Import a CSV of students, professors, programs, departments, subjects or
/// classrooms. Admin only.
pub async fn import_entities(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(entidad): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let kind = ImportKind::from_selector(&entidad).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown import entity '{entidad}'"
        )))
    })?;
    tracing::info!(kind = %kind, admin_id = %admin.account_id, "Import requested");
    run_upload(&state, kind, multipart).await
}

// ── Curriculum import ────────────────────────────────────────────────

/// POST /api/v1/import/carreras/{codigo}/materias
///
/// Replace the subject list of program `codigo` with the subjects listed in
/// the uploaded CSV. Admin only.
pub async fn import_curriculum(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(codigo): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let program_code = parse_integer(&codigo)
        .filter(|code| *code > 0)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Invalid program code '{codigo}'"
            )))
        })?;
    let kind = ImportKind::Curriculum { program_code };
    tracing::info!(kind = %kind, admin_id = %admin.account_id, "Import requested");
    run_upload(&state, kind, multipart).await
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn run_upload(
    state: &AppState,
    kind: ImportKind,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let upload = stage_upload(&state.config, kind, multipart).await?;

    let summary = {
        let _running = state.import_locks.acquire(kind).await;
        import_file(state.store.as_ref(), kind, upload.path()).await
    };
    remove_upload(upload);

    let summary = summary?;
    Ok(Json(DataResponse::success(ImportResult {
        processed: summary.processed,
    })))
}

/// Read the `file` field, enforce the `.csv` extension and size limit, and
/// write it to a uniquely named temporary file in the upload directory.
///
/// The file lives as long as the returned handle.
async fn stage_upload(
    config: &ServerConfig,
    kind: ImportKind,
    mut multipart: Multipart,
) -> AppResult<NamedTempFile> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let is_csv = FsPath::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(AppError::BadRequest(format!(
                "Unsupported file '{filename}'. Expected a .csv file"
            )));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if data.len() + chunk.len() > config.max_upload_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the maximum of {} bytes",
                    config.max_upload_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
        let upload = tempfile::Builder::new()
            .prefix(&format!("{}-", kind.as_str()))
            .suffix(".csv")
            .tempfile_in(&config.upload_dir)
            .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")))?;
        tokio::fs::write(upload.path(), &data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

        tracing::debug!(
            kind = %kind,
            path = %upload.path().display(),
            bytes = data.len(),
            "Upload staged"
        );
        return Ok(upload);
    }

    Err(AppError::BadRequest(format!(
        "Missing required '{FILE_FIELD}' field"
    )))
}

/// Delete the staged file now, logging failures. Dropping the handle early
/// (timeout, disconnect) also deletes it, silently.
fn remove_upload(upload: NamedTempFile) {
    let path = upload.path().to_path_buf();
    if let Err(e) = upload.close() {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
    }
}
