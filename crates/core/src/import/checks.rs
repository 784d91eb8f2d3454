//! Row checks for the import pipeline.
//!
//! Each [`FieldCheck`] reads one raw cell (or a value normalised by an
//! earlier check), rejects the row with a human-readable reason, or writes
//! the normalised value into the row's update. Reference checks resolve codes
//! through the [`DocumentStore`] and replace them with document ids.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::row::RowRecord;
use crate::store::{document_id, Collection, DocumentStore, Filter, StoreError};
use crate::validation::primitives::{as_integer, parse_integer};

/// Words of letters (accented letters and ñ included) separated by single spaces.
const NAME_PATTERN: &str = r"^[a-zA-ZÀ-ÿñÑ]+( [a-zA-ZÀ-ÿñÑ]+)*$";

/// `<department code>.<subject code>`
const SUBJECT_CODE_PATTERN: &str = r"^(\d+)\.(\d+)$";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("valid regex"));
static SUBJECT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUBJECT_CODE_PATTERN).expect("valid regex"));

/// Field written into `set_on_insert` with the seeded password hash.
pub const PASSWORD_FIELD: &str = "password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// Integer greater than zero.
    PositiveInteger {
        column: &'static str,
        field: &'static str,
    },
    /// Positive integer that also seeds the account password.
    NationalId {
        column: &'static str,
        field: &'static str,
    },
    PersonName {
        column: &'static str,
        field: &'static str,
    },
    /// JSON list of distinct program codes, resolved to program ids.
    ProgramCodes {
        column: &'static str,
        field: &'static str,
    },
    IntegerInRange {
        column: &'static str,
        field: &'static str,
        min: i64,
        max: i64,
    },
    OneOf {
        column: &'static str,
        field: &'static str,
        options: &'static [&'static str],
    },
    NonEmpty {
        column: &'static str,
        field: &'static str,
    },
    /// Give a program that does not exist yet an empty subject list.
    ProgramExists { field: &'static str },
    /// Resolve a normalised department code and attach the department id.
    DepartmentRef {
        code_field: &'static str,
        field: &'static str,
    },
    /// Resolve `<department>.<subject>` to a subject id.
    SubjectCode {
        column: &'static str,
        field: &'static str,
    },
}

/// Why a check did not pass.
#[derive(Debug)]
pub enum CheckFailure {
    /// The row is invalid; the message is shown to the uploader.
    Rejected(String),
    /// A reference lookup could not be performed.
    Lookup(StoreError),
    Internal(String),
}

impl From<StoreError> for CheckFailure {
    fn from(err: StoreError) -> Self {
        Self::Lookup(err)
    }
}

fn reject(message: String) -> CheckFailure {
    CheckFailure::Rejected(message)
}

impl FieldCheck {
    /// CSV column read by this check, if it reads one.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Self::PositiveInteger { column, .. }
            | Self::NationalId { column, .. }
            | Self::PersonName { column, .. }
            | Self::ProgramCodes { column, .. }
            | Self::IntegerInRange { column, .. }
            | Self::OneOf { column, .. }
            | Self::NonEmpty { column, .. }
            | Self::SubjectCode { column, .. } => Some(column),
            Self::ProgramExists { .. } | Self::DepartmentRef { .. } => None,
        }
    }

    /// Document field this check writes or inspects.
    pub fn field(&self) -> &'static str {
        match self {
            Self::PositiveInteger { field, .. }
            | Self::NationalId { field, .. }
            | Self::PersonName { field, .. }
            | Self::ProgramCodes { field, .. }
            | Self::IntegerInRange { field, .. }
            | Self::OneOf { field, .. }
            | Self::NonEmpty { field, .. }
            | Self::ProgramExists { field }
            | Self::DepartmentRef { field, .. }
            | Self::SubjectCode { field, .. } => field,
        }
    }

    pub async fn apply(
        &self,
        row: &mut RowRecord,
        store: &dyn DocumentStore,
    ) -> Result<(), CheckFailure> {
        match *self {
            Self::PositiveInteger { column, field } => {
                let n = positive_integer(column, row.cell(column))?;
                row.set.insert(field.to_string(), n.into());
            }
            Self::NationalId { column, field } => {
                let dni = positive_integer(column, row.cell(column))?;
                row.set.insert(field.to_string(), dni.into());
                row.password_seed = Some(dni.to_string());
            }
            Self::PersonName { column, field } => {
                let name = row.cell(column);
                if !NAME_RE.is_match(name) {
                    return Err(reject(format!(
                        "El campo '{column}' solo puede contener letras separadas por un espacio"
                    )));
                }
                let name = name.to_string();
                row.set.insert(field.to_string(), Value::String(name));
            }
            Self::ProgramCodes { column, field } => {
                let codes = program_codes(column, row.cell(column))?;
                let ids = resolve_programs(store, &codes).await?;
                row.set.insert(field.to_string(), Value::Array(ids));
            }
            Self::IntegerInRange {
                column,
                field,
                min,
                max,
            } => {
                let n = parse_integer(row.cell(column))
                    .filter(|n| (min..=max).contains(n))
                    .ok_or_else(|| {
                        reject(format!(
                            "El campo '{column}' debe ser un número entero entre {min} y {max}"
                        ))
                    })?;
                row.set.insert(field.to_string(), n.into());
            }
            Self::OneOf {
                column,
                field,
                options,
            } => {
                let value = row.cell(column);
                if !options.contains(&value) {
                    return Err(reject(format!(
                        "El campo '{column}' debe ser uno de: {}",
                        options.join(", ")
                    )));
                }
                let value = value.to_string();
                row.set.insert(field.to_string(), Value::String(value));
            }
            Self::NonEmpty { column, field } => {
                let value = row.cell(column);
                if value.is_empty() {
                    return Err(reject(format!("El campo '{column}' no puede estar vacío")));
                }
                let value = value.to_string();
                row.set.insert(field.to_string(), Value::String(value));
            }
            Self::ProgramExists { field } => {
                let code = row.set.get(field).cloned().unwrap_or(Value::Null);
                let existing = store
                    .find_one(Collection::Programs, &Filter::new().eq(field, code))
                    .await?;
                if existing.is_none() {
                    row.set.insert("materias".to_string(), Value::Array(Vec::new()));
                }
            }
            Self::DepartmentRef { code_field, field } => {
                let code = row.set.get(code_field).and_then(as_integer).ok_or_else(|| {
                    CheckFailure::Internal(format!("'{code_field}' was not normalised"))
                })?;
                let department = store
                    .find_one(Collection::Departments, &Filter::new().eq("codigo", code))
                    .await?
                    .and_then(|doc| document_id(&doc))
                    .ok_or_else(|| {
                        reject(format!("No existe el departamento con código {code}"))
                    })?;
                row.set.insert(field.to_string(), department.into());
            }
            Self::SubjectCode { column, field } => {
                let raw = row.cell(column);
                let (department, subject) = subject_code(raw).ok_or_else(|| {
                    reject(format!(
                        "El campo '{column}' debe tener el formato <departamento>.<materia>"
                    ))
                })?;
                let filter = Filter::new()
                    .eq("codigoDepartamento", department)
                    .eq("codigo", subject);
                let id = store
                    .find_one(Collection::Subjects, &filter)
                    .await?
                    .and_then(|doc| document_id(&doc))
                    .ok_or_else(|| reject(format!("No existe la materia con código {raw}")))?;
                row.set.insert(field.to_string(), id.into());
            }
        }
        Ok(())
    }
}

fn positive_integer(column: &str, raw: &str) -> Result<i64, CheckFailure> {
    parse_integer(raw)
        .filter(|n| *n > 0)
        .ok_or_else(|| reject(format!("El campo '{column}' debe ser un número entero positivo")))
}

fn subject_code(raw: &str) -> Option<(i64, i64)> {
    let captures = SUBJECT_CODE_RE.captures(raw)?;
    let department = captures[1].parse().ok()?;
    let subject = captures[2].parse().ok()?;
    Some((department, subject))
}

fn program_codes(column: &str, raw: &str) -> Result<Vec<i64>, CheckFailure> {
    let invalid = || {
        reject(format!(
            "El campo '{column}' debe ser una lista de códigos de carrera, por ejemplo [9,10]"
        ))
    };

    let items: Vec<Value> = serde_json::from_str(raw).map_err(|_| invalid())?;
    if items.is_empty() {
        return Err(reject(format!(
            "El campo '{column}' debe contener al menos una carrera"
        )));
    }

    let mut seen = HashSet::new();
    let mut codes = Vec::with_capacity(items.len());
    for item in &items {
        let code = as_integer(item).filter(|n| *n > 0).ok_or_else(invalid)?;
        if !seen.insert(code) {
            return Err(reject(format!(
                "El campo '{column}' repite la carrera con código {code}"
            )));
        }
        codes.push(code);
    }
    Ok(codes)
}

/// Program ids for `codes`, in input order. Every code must exist.
async fn resolve_programs(
    store: &dyn DocumentStore,
    codes: &[i64],
) -> Result<Vec<Value>, CheckFailure> {
    let filter = Filter::new().any_of("codigo", codes.iter().map(|c| Value::from(*c)).collect());
    let found: HashMap<i64, Value> = store
        .find(Collection::Programs, &filter)
        .await?
        .iter()
        .filter_map(|doc| {
            let code = doc.get("codigo").and_then(as_integer)?;
            Some((code, document_id(doc)?.into()))
        })
        .collect();

    let missing: Vec<String> = codes
        .iter()
        .filter(|code| !found.contains_key(code))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(reject(format!(
            "No existen las carreras con código: {}",
            missing.join(", ")
        )));
    }

    Ok(codes.iter().filter_map(|code| found.get(code).cloned()).collect())
}
