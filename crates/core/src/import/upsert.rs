//! Upsert construction for validated rows.

use serde_json::Value;

use super::kind::ImportKind;
use super::row::RowRecord;
use super::ImportError;
use crate::store::{Document, Filter, UpsertOp};

/// Field holding a program's ordered subject ids.
pub const CURRICULUM_FIELD: &str = "materias";

/// One upsert per row, keyed by the kind's natural key.
///
/// A curriculum import collapses into a single non-inserting update that
/// replaces the program's subject list.
pub fn build_upserts(kind: ImportKind, rows: Vec<RowRecord>) -> Result<Vec<UpsertOp>, ImportError> {
    if let ImportKind::Curriculum { program_code } = kind {
        return Ok(vec![curriculum_update(program_code, rows)]);
    }

    rows.into_iter()
        .map(|row| {
            let mut filter = Filter::new();
            for key in kind.natural_key() {
                let value = row.set.get(*key).cloned().ok_or_else(|| {
                    ImportError::Internal(format!(
                        "row {} has no value for natural key '{key}'",
                        row.number
                    ))
                })?;
                filter = filter.eq(*key, value);
            }
            Ok(UpsertOp {
                filter,
                set: row.set,
                set_on_insert: row.set_on_insert,
                upsert: true,
            })
        })
        .collect()
}

fn curriculum_update(program_code: i64, rows: Vec<RowRecord>) -> UpsertOp {
    let mut subjects: Vec<Value> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(id) = row.set.get("materia") {
            if !subjects.contains(id) {
                subjects.push(id.clone());
            }
        }
    }

    let mut set = Document::new();
    set.insert(CURRICULUM_FIELD.to_string(), Value::Array(subjects));
    UpsertOp {
        filter: Filter::new().eq("codigo", program_code),
        set,
        set_on_insert: Document::new(),
        upsert: false,
    }
}
