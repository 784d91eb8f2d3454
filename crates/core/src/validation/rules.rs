//! Rule vocabulary: value types, input sources, requirement levels and the
//! [`InputCheck`] produced by the [`ValidationConfig`](super::ValidationConfig)
//! factories.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::inputs::RequestInputs;
use super::path::FieldPath;
use super::{evaluator, ValidationError};

/// Expected type of an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Email,
    Identifier,
    Array,
    Object,
}

impl FieldType {
    pub const ALL: &'static [FieldType] = &[
        Self::String,
        Self::Integer,
        Self::Number,
        Self::Boolean,
        Self::Date,
        Self::Email,
        Self::Identifier,
        Self::Array,
        Self::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Email => "email",
            Self::Identifier => "identifier",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

/// Part of the request an input is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Header,
    Body,
    Query,
    Path,
}

impl InputSource {
    pub const ALL: &'static [InputSource] = &[Self::Header, Self::Body, Self::Query, Self::Path];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Query => "query",
            Self::Path => "path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Mandatory,
    Optional,
}

impl Requirement {
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }
}

/// Optional value constraints for flat field checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub allowed_values: Option<Vec<Value>>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl Constraints {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn allowed<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            allowed_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min_value: min,
            max_value: max,
            ..Self::default()
        }
    }
}

/// A flat check: direct key lookup, no descent.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub key: String,
    pub field_type: FieldType,
    pub source: InputSource,
    pub requirement: Requirement,
    pub constraints: Constraints,
}

/// A deep check over a pre-parsed path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRule {
    pub path: FieldPath,
    pub field_type: FieldType,
    pub source: InputSource,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CheckKind {
    Field(FieldRule),
    Path(PathRule),
}

/// One declared request check.
///
/// A check built from a malformed declaration keeps its
/// [`ValidationError::Configuration`] and reports it on every run, so the
/// defect surfaces on the route that declared it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputCheck {
    kind: Result<CheckKind, ValidationError>,
}

impl InputCheck {
    pub(crate) fn new(kind: Result<CheckKind, ValidationError>) -> Self {
        Self { kind }
    }

    pub fn field(rule: FieldRule) -> Self {
        Self::new(Ok(CheckKind::Field(rule)))
    }

    pub fn path(rule: PathRule) -> Self {
        Self::new(Ok(CheckKind::Path(rule)))
    }

    /// Source read by this check, `None` for misconfigured checks.
    pub fn source(&self) -> Option<InputSource> {
        match &self.kind {
            Ok(CheckKind::Field(rule)) => Some(rule.source),
            Ok(CheckKind::Path(rule)) => Some(rule.source),
            Err(_) => None,
        }
    }

    pub fn configuration_error(&self) -> Option<&ValidationError> {
        self.kind.as_ref().err()
    }

    pub fn run(&self, inputs: &RequestInputs) -> Result<(), ValidationError> {
        match &self.kind {
            Ok(CheckKind::Field(rule)) => evaluator::check_field(rule, inputs),
            Ok(CheckKind::Path(rule)) => evaluator::check_path(rule, inputs),
            Err(err) => Err(err.clone()),
        }
    }
}
