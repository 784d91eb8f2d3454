//! Bulk import of entities from CSV files.
//!
//! A run moves through [`ImportStage`]s: the file is parsed, every row is
//! checked in order against its kind's check list, passwords are hashed for
//! accounts that do not exist yet, and only then are the upserts committed in
//! one bulk write. The first failing row stops the run with nothing written.

pub mod checks;
pub mod kind;
pub mod pipeline;
pub mod reader;
pub mod row;
pub mod seeding;
pub mod upsert;

use serde::Serialize;

use crate::store::StoreError;

pub use kind::ImportKind;
pub use pipeline::{import_file, run_import};
pub use row::{ImportRowResult, RowStatus};

/// Lifecycle of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStage {
    Parsing,
    Validating,
    Seeding,
    Committing,
    Succeeded,
    Failed,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Validating => "validating",
            Self::Seeding => "seeding",
            Self::Committing => "committing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows read from the file and committed.
    pub processed: usize,
    pub matched: usize,
    pub inserted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("El archivo CSV es inválido: {0}")]
    Parse(String),

    /// A row failed its checks; `row` is 1-based after the header.
    #[error("Fila {row}: {message}")]
    Row { row: usize, message: String },

    /// An entity the whole run depends on does not exist.
    #[error("{0}")]
    Reference(String),

    #[error("Reference lookup failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("Failed to commit imported rows: {0}")]
    Commit(#[source] StoreError),

    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import failed: {0}")]
    Internal(String),
}

impl ImportError {
    /// Failing row result, for row failures only.
    pub fn row_result(&self) -> Option<ImportRowResult> {
        match self {
            Self::Row { row, message } => Some(ImportRowResult::failed(*row, message.clone())),
            _ => None,
        }
    }
}
