use std::collections::HashMap;

use serde::Serialize;

use crate::store::Document;

/// One data row of an import file, mapped onto the kind's header list.
///
/// Checks read the raw `cells` and write normalised values into `set`
/// (always written) or `set_on_insert` (written only when the entity is
/// created). `password_seed` holds the initial password of an account row
/// until it is hashed, which only happens for accounts that do not exist yet.
#[derive(Debug, Clone, Default)]
pub struct RowRecord {
    /// 1-based position after the header row.
    pub number: usize,
    cells: HashMap<&'static str, String>,
    pub set: Document,
    pub set_on_insert: Document,
    pub password_seed: Option<String>,
}

impl RowRecord {
    pub fn new(number: usize, headers: &'static [&'static str], values: Vec<String>) -> Self {
        Self {
            number,
            cells: headers.iter().copied().zip(values).collect(),
            set: Document::new(),
            set_on_insert: Document::new(),
            password_seed: None,
        }
    }

    /// Raw cell under `column`; empty when the column is absent.
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Ok,
    Failed,
}

/// Outcome of validating a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowResult {
    pub row_number: usize,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImportRowResult {
    pub fn ok(row_number: usize) -> Self {
        Self {
            row_number,
            status: RowStatus::Ok,
            message: None,
        }
    }

    pub fn failed(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            status: RowStatus::Failed,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RowStatus::Ok
    }
}
