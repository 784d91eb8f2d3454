//! Import run orchestration: parse, validate row by row, commit.

use std::path::Path;

use super::checks::CheckFailure;
use super::kind::ImportKind;
use super::row::{ImportRowResult, RowRecord};
use super::{reader, seeding, upsert, ImportError, ImportStage, ImportSummary};
use crate::store::{Collection, DocumentStore, Filter};

/// Read `path` and import its contents.
pub async fn import_file(
    store: &dyn DocumentStore,
    kind: ImportKind,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let bytes = tokio::fs::read(path).await.inspect_err(|e| {
        tracing::warn!(kind = %kind, path = %path.display(), error = %e, "Failed to read import file");
    })?;
    run_import(store, kind, &bytes).await
}

/// Import CSV `bytes` as entities of `kind`.
///
/// Rows are validated strictly in file order, each lookup awaited before the
/// next check. Nothing is written unless every row passes. Passwords are only
/// hashed after validation, and only for accounts the run will create.
pub async fn run_import(
    store: &dyn DocumentStore,
    kind: ImportKind,
    bytes: &[u8],
) -> Result<ImportSummary, ImportError> {
    let result = execute(store, kind, bytes).await;
    match &result {
        Ok(summary) => {
            tracing::info!(
                kind = %kind,
                stage = %ImportStage::Succeeded,
                processed = summary.processed,
                matched = summary.matched,
                inserted = summary.inserted,
                "Import finished"
            );
        }
        Err(ImportError::Row { row, message }) => {
            tracing::info!(
                kind = %kind,
                stage = %ImportStage::Failed,
                row = *row,
                reason = %message,
                "Import rejected"
            );
        }
        Err(err) => {
            tracing::error!(kind = %kind, stage = %ImportStage::Failed, error = %err, "Import failed");
        }
    }
    result
}

async fn execute(
    store: &dyn DocumentStore,
    kind: ImportKind,
    bytes: &[u8],
) -> Result<ImportSummary, ImportError> {
    enter(kind, ImportStage::Parsing);
    let mut rows = reader::parse_rows(kind, bytes)?;

    if let ImportKind::Curriculum { program_code } = kind {
        ensure_program_exists(store, program_code).await?;
    }

    enter(kind, ImportStage::Validating);
    for row in rows.iter_mut() {
        let result = validate_row(store, kind, row).await?;
        if !result.is_ok() {
            return Err(ImportError::Row {
                row: result.row_number,
                message: result.message.unwrap_or_default(),
            });
        }
    }

    if rows.is_empty() {
        return Ok(ImportSummary::default());
    }

    enter(kind, ImportStage::Seeding);
    seeding::seed_passwords(store, kind, &mut rows).await?;

    enter(kind, ImportStage::Committing);
    let processed = rows.len();
    let ops = upsert::build_upserts(kind, rows)?;
    let written = store
        .bulk_upsert(kind.collection(), &ops)
        .await
        .map_err(ImportError::Commit)?;

    Ok(ImportSummary {
        processed,
        matched: written.matched,
        inserted: written.inserted,
    })
}

/// Run `kind`'s checks over one row, stopping at the first that rejects it.
///
/// Store failures abort the run; they say nothing about the row itself.
pub async fn validate_row(
    store: &dyn DocumentStore,
    kind: ImportKind,
    row: &mut RowRecord,
) -> Result<ImportRowResult, ImportError> {
    for check in kind.checks() {
        match check.apply(row, store).await {
            Ok(()) => {}
            Err(CheckFailure::Rejected(message)) => {
                return Ok(ImportRowResult::failed(row.number, message));
            }
            Err(CheckFailure::Lookup(err)) => return Err(ImportError::Lookup(err)),
            Err(CheckFailure::Internal(message)) => return Err(ImportError::Internal(message)),
        }
    }
    Ok(ImportRowResult::ok(row.number))
}

async fn ensure_program_exists(
    store: &dyn DocumentStore,
    program_code: i64,
) -> Result<(), ImportError> {
    let program = store
        .find_one(Collection::Programs, &Filter::new().eq("codigo", program_code))
        .await
        .map_err(ImportError::Lookup)?;
    match program {
        Some(_) => Ok(()),
        None => Err(ImportError::Reference(format!(
            "No existe la carrera con código {program_code}"
        ))),
    }
}

fn enter(kind: ImportKind, stage: ImportStage) {
    tracing::debug!(kind = %kind, stage = %stage, "Import stage");
}
