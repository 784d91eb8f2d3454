//! Immutable validation vocabulary and the rule factories built on it.
//!
//! A single [`ValidationConfig`] is constructed at startup and shared (behind
//! an `Arc`) with every route that declares checks.

use std::collections::HashMap;

use super::path::FieldPath;
use super::rules::{
    CheckKind, Constraints, FieldRule, FieldType, InputCheck, InputSource, PathRule, Requirement,
};
use super::ValidationError;

/// Reserved path segment meaning "every element of this list".
pub const DEFAULT_WILDCARD: &str = "$";

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    types: HashMap<&'static str, FieldType>,
    sources: HashMap<&'static str, InputSource>,
    wildcard: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::with_wildcard(DEFAULT_WILDCARD)
    }
}

impl ValidationConfig {
    pub fn with_wildcard(wildcard: impl Into<String>) -> Self {
        Self {
            types: FieldType::ALL.iter().map(|t| (t.as_str(), *t)).collect(),
            sources: InputSource::ALL.iter().map(|s| (s.as_str(), *s)).collect(),
            wildcard: wildcard.into(),
        }
    }

    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.types.get(name).copied()
    }

    pub fn source(&self, name: &str) -> Option<InputSource> {
        self.sources.get(name).copied()
    }

    /// Accepts `mandatory`/`optional` and the boolean spellings `true`/`false`.
    pub fn requirement(&self, name: &str) -> Option<Requirement> {
        match name {
            "mandatory" | "true" => Some(Requirement::Mandatory),
            "optional" | "false" => Some(Requirement::Optional),
            _ => None,
        }
    }

    /// Flat check: `key` is looked up directly in the `source` bag.
    pub fn validate_field(
        &self,
        key: &str,
        type_name: &str,
        source_name: &str,
        required: &str,
        constraints: Constraints,
    ) -> InputCheck {
        let rule = self.resolve(key, type_name, source_name, required).and_then(
            |(field_type, source, requirement)| {
                if key.trim().is_empty() {
                    return Err(configuration(key, "field key must be a non-empty string"));
                }
                Ok(CheckKind::Field(FieldRule {
                    key: key.to_string(),
                    field_type,
                    source,
                    requirement,
                    constraints,
                }))
            },
        );
        log_misconfiguration(&rule);
        InputCheck::new(rule)
    }

    /// Deep check: `path` is split on `.` and walked into the `source` bag.
    pub fn validate_path(
        &self,
        path: &str,
        type_name: &str,
        source_name: &str,
        required: &str,
    ) -> InputCheck {
        let rule = self.resolve(path, type_name, source_name, required).and_then(
            |(field_type, source, requirement)| {
                Ok(CheckKind::Path(PathRule {
                    path: FieldPath::parse(path, &self.wildcard)?,
                    field_type,
                    source,
                    requirement,
                }))
            },
        );
        log_misconfiguration(&rule);
        InputCheck::new(rule)
    }

    fn resolve(
        &self,
        field: &str,
        type_name: &str,
        source_name: &str,
        required: &str,
    ) -> Result<(FieldType, InputSource, Requirement), ValidationError> {
        let field_type = self
            .field_type(type_name)
            .ok_or_else(|| configuration(field, &format!("unknown type '{type_name}'")))?;
        let source = self
            .source(source_name)
            .ok_or_else(|| configuration(field, &format!("unknown source '{source_name}'")))?;
        let requirement = self.requirement(required).ok_or_else(|| {
            configuration(
                field,
                &format!("required must be mandatory or optional, got '{required}'"),
            )
        })?;
        Ok((field_type, source, requirement))
    }
}

fn configuration(field: &str, reason: &str) -> ValidationError {
    ValidationError::Configuration {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn log_misconfiguration(rule: &Result<CheckKind, ValidationError>) {
    if let Err(err) = rule {
        tracing::error!(field = err.field(), error = %err, "Route declared an invalid input check");
    }
}
