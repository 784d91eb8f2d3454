//! Check evaluator: pure logic, no I/O.

use serde_json::Value;

use super::inputs::RequestInputs;
use super::path::Segment;
use super::primitives::{as_number, check_type};
use super::rules::{
    Constraints, FieldRule, FieldType, InputCheck, InputSource, PathRule, Requirement,
};
use super::ValidationError;

/// Run `checks` in order, stopping at the first failure.
pub fn run_checks(checks: &[InputCheck], inputs: &RequestInputs) -> Result<(), ValidationError> {
    checks.iter().try_for_each(|check| check.run(inputs))
}

pub(crate) fn check_field(rule: &FieldRule, inputs: &RequestInputs) -> Result<(), ValidationError> {
    match inputs.get(rule.source, &rule.key) {
        Some(value) => {
            if check_type(rule.field_type, value)
                && satisfies(&rule.constraints, rule.field_type, value)
            {
                Ok(())
            } else {
                Err(ValidationError::Invalid {
                    field: rule.key.clone(),
                })
            }
        }
        None if rule.requirement.is_mandatory() => Err(ValidationError::Missing {
            field: rule.key.clone(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_path(rule: &PathRule, inputs: &RequestInputs) -> Result<(), ValidationError> {
    let root = Value::Object(inputs.bag(rule.source).clone());
    let walker = PathWalker {
        field_type: rule.field_type,
        requirement: rule.requirement,
    };
    let mut trail = Vec::new();
    match (rule.source, rule.path.segments()) {
        // Header names are stored lower-cased.
        (InputSource::Header, [Segment::Key(name), rest @ ..]) => {
            let mut segments = Vec::with_capacity(rest.len() + 1);
            segments.push(Segment::Key(name.to_ascii_lowercase()));
            segments.extend_from_slice(rest);
            walker.walk(&root, &segments, &mut trail)
        }
        (_, segments) => walker.walk(&root, segments, &mut trail),
    }
}

fn satisfies(constraints: &Constraints, field_type: FieldType, value: &Value) -> bool {
    if let Some(allowed) = &constraints.allowed_values {
        if !allowed.iter().any(|candidate| same_literal(candidate, value)) {
            return false;
        }
    }
    if field_type.is_numeric() {
        let Some(n) = as_number(value) else {
            return false;
        };
        if constraints.min_value.is_some_and(|min| n < min)
            || constraints.max_value.is_some_and(|max| n > max)
        {
            return false;
        }
    }
    true
}

/// Transport values arrive as strings, so `"5"` matches an allowed `5`.
fn same_literal(candidate: &Value, value: &Value) -> bool {
    if candidate == value {
        return true;
    }
    match (candidate, value) {
        (Value::Number(n), Value::String(s)) => n.to_string() == *s,
        (Value::Bool(b), Value::String(s)) => b.to_string() == *s,
        _ => false,
    }
}

/// Interpreter over pre-parsed path segments.
///
/// `trail` holds the concrete path walked so far, with list indices in place
/// of wildcards, so failures name the exact element.
struct PathWalker {
    field_type: FieldType,
    requirement: Requirement,
}

impl PathWalker {
    fn walk(
        &self,
        current: &Value,
        segments: &[Segment],
        trail: &mut Vec<String>,
    ) -> Result<(), ValidationError> {
        let Some((segment, rest)) = segments.split_first() else {
            return if check_type(self.field_type, current) {
                Ok(())
            } else {
                Err(ValidationError::Invalid {
                    field: trail.join("."),
                })
            };
        };

        match segment {
            Segment::Key(key) => {
                trail.push(key.clone());
                let result = match current.as_object().and_then(|map| map.get(key)) {
                    Some(child) => self.walk(child, rest, trail),
                    None if !rest.is_empty() => Err(ValidationError::NotFound {
                        field: trail.join("."),
                    }),
                    None if self.requirement.is_mandatory() => Err(ValidationError::Missing {
                        field: trail.join("."),
                    }),
                    None => Ok(()),
                };
                trail.pop();
                result
            }
            Segment::Wildcard => match current.as_array() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        trail.push(index.to_string());
                        let result = self.walk(item, rest, trail);
                        trail.pop();
                        result?;
                    }
                    Ok(())
                }
                None if !rest.is_empty() || self.requirement.is_mandatory() => {
                    Err(ValidationError::Invalid {
                        field: trail.join("."),
                    })
                }
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationConfig;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn body(value: Value) -> RequestInputs {
        RequestInputs::new().with_body(value)
    }

    // -- flat field checks --------------------------------------------------

    #[test]
    fn mandatory_absent_field_names_the_field() {
        let config = ValidationConfig::default();
        let check = config.validate_field("dni", "integer", "body", "mandatory", Constraints::none());
        assert_eq!(
            check.run(&body(json!({}))),
            Err(ValidationError::Missing { field: "dni".into() })
        );
    }

    #[test]
    fn optional_absent_field_passes() {
        let config = ValidationConfig::default();
        let check = config.validate_field("dni", "integer", "body", "optional", Constraints::none());
        assert_eq!(check.run(&body(json!({}))), Ok(()));
    }

    #[test]
    fn integer_field_accepts_text_and_native() {
        let config = ValidationConfig::default();
        let check = config.validate_field("n", "integer", "body", "mandatory", Constraints::none());
        assert!(check.run(&body(json!({"n": "5"}))).is_ok());
        assert!(check.run(&body(json!({"n": 5}))).is_ok());
        for bad in ["5.5", "abc", ""] {
            assert_eq!(
                check.run(&body(json!({ "n": bad }))),
                Err(ValidationError::Invalid { field: "n".into() }),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn flat_lookup_does_not_descend() {
        let config = ValidationConfig::default();
        let check =
            config.validate_field("periodo.inicio", "date", "body", "mandatory", Constraints::none());
        let inputs = body(json!({"periodo": {"inicio": "2024-03-01"}}));
        assert_matches!(check.run(&inputs), Err(ValidationError::Missing { .. }));
    }

    #[test]
    fn allowed_values_are_enforced() {
        let config = ValidationConfig::default();
        let check = config.validate_field(
            "rol",
            "string",
            "body",
            "optional",
            Constraints::allowed(["alumno", "docente"]),
        );
        assert!(check.run(&body(json!({"rol": "docente"}))).is_ok());
        assert_eq!(
            check.run(&body(json!({"rol": "rector"}))),
            Err(ValidationError::Invalid { field: "rol".into() })
        );
    }

    #[test]
    fn allowed_numbers_match_textual_inputs() {
        let config = ValidationConfig::default();
        let check = config.validate_field(
            "cuatrimestre",
            "integer",
            "query",
            "mandatory",
            Constraints::allowed([1, 2]),
        );
        assert!(check.run(&RequestInputs::new().with_query("cuatrimestre", "2")).is_ok());
        assert!(check.run(&RequestInputs::new().with_query("cuatrimestre", "3")).is_err());
    }

    #[test]
    fn numeric_range_is_enforced() {
        let config = ValidationConfig::default();
        let check = config.validate_field(
            "prioridad",
            "integer",
            "query",
            "mandatory",
            Constraints::range(Some(1.0), Some(120.0)),
        );
        assert!(check.run(&RequestInputs::new().with_query("prioridad", "120")).is_ok());
        assert!(check.run(&RequestInputs::new().with_query("prioridad", "0")).is_err());
        assert!(check.run(&RequestInputs::new().with_query("prioridad", "121")).is_err());
    }

    #[test]
    fn headers_are_case_insensitive() {
        let config = ValidationConfig::default();
        let check =
            config.validate_field("X-Api-Version", "integer", "header", "mandatory", Constraints::none());
        let inputs = RequestInputs::new().with_header("x-api-version", "2");
        assert!(check.run(&inputs).is_ok());
    }

    #[test]
    fn path_params_are_read_from_the_path_bag() {
        let config = ValidationConfig::default();
        let check =
            config.validate_field("codigo", "integer", "path", "mandatory", Constraints::none());
        assert!(check.run(&RequestInputs::new().with_path_param("codigo", "9")).is_ok());
        assert!(check.run(&RequestInputs::new().with_query("codigo", "9")).is_err());
    }

    #[test]
    fn misconfigured_check_fails_every_run() {
        let config = ValidationConfig::default();
        let check = config.validate_field("dni", "integer", "form", "mandatory", Constraints::none());
        assert_matches!(
            check.run(&body(json!({"dni": "1"}))),
            Err(ValidationError::Configuration { .. })
        );
    }

    #[test]
    fn run_checks_stops_at_first_failure() {
        let config = ValidationConfig::default();
        let checks = vec![
            config.validate_field("dni", "integer", "body", "mandatory", Constraints::none()),
            config.validate_field("password", "string", "body", "mandatory", Constraints::none()),
        ];
        assert_eq!(
            run_checks(&checks, &body(json!({}))),
            Err(ValidationError::Missing { field: "dni".into() })
        );
        assert_eq!(
            run_checks(&checks, &body(json!({"dni": "1"}))),
            Err(ValidationError::Missing { field: "password".into() })
        );
        assert!(run_checks(&checks, &body(json!({"dni": "1", "password": "x"}))).is_ok());
    }

    // -- path checks --------------------------------------------------------

    #[test]
    fn nested_invalid_date_names_the_full_path() {
        let config = ValidationConfig::default();
        let check = config.validate_path("periodo.inicio", "date", "body", "mandatory");
        assert_eq!(
            check.run(&body(json!({"periodo": {"inicio": "not-a-date"}}))),
            Err(ValidationError::Invalid { field: "periodo.inicio".into() })
        );
        assert!(check
            .run(&body(json!({"periodo": {"inicio": "2024-03-01"}})))
            .is_ok());
    }

    #[test]
    fn missing_intermediate_segment_is_not_found() {
        let config = ValidationConfig::default();
        let check = config.validate_path("periodo.inicio", "date", "body", "optional");
        assert_eq!(
            check.run(&body(json!({}))),
            Err(ValidationError::NotFound { field: "periodo".into() })
        );
    }

    #[test]
    fn missing_terminal_segment_depends_on_requirement() {
        let config = ValidationConfig::default();
        let inputs = body(json!({"periodo": {}}));

        let mandatory = config.validate_path("periodo.fin", "date", "body", "mandatory");
        assert_eq!(
            mandatory.run(&inputs),
            Err(ValidationError::Missing { field: "periodo.fin".into() })
        );

        let optional = config.validate_path("periodo.fin", "date", "body", "optional");
        assert_eq!(optional.run(&inputs), Ok(()));
    }

    #[test]
    fn wildcard_reports_first_failing_element() {
        let config = ValidationConfig::default();
        let check = config.validate_path("items.$.id", "integer", "body", "mandatory");

        let failing = body(json!({"items": [{"id": "5"}, {"id": "bad"}, {"id": "worse"}]}));
        assert_eq!(
            check.run(&failing),
            Err(ValidationError::Invalid { field: "items.1.id".into() })
        );

        let passing = body(json!({"items": [{"id": "5"}, {"id": "6"}]}));
        assert_eq!(check.run(&passing), Ok(()));
    }

    #[test]
    fn wildcard_over_empty_list_passes() {
        let config = ValidationConfig::default();
        let check = config.validate_path("items.$.id", "integer", "body", "mandatory");
        assert!(check.run(&body(json!({"items": []}))).is_ok());
    }

    #[test]
    fn wildcard_element_missing_key_is_mandatory() {
        let config = ValidationConfig::default();
        let check = config.validate_path("items.$.id", "integer", "body", "mandatory");
        assert_eq!(
            check.run(&body(json!({"items": [{"id": 1}, {}]}))),
            Err(ValidationError::Missing { field: "items.1.id".into() })
        );
    }

    #[test]
    fn terminal_wildcard_checks_elements_themselves() {
        let config = ValidationConfig::default();
        let check = config.validate_path("codigos.$", "integer", "body", "mandatory");
        assert!(check.run(&body(json!({"codigos": [9, "10"]}))).is_ok());
        assert_eq!(
            check.run(&body(json!({"codigos": [9, "x"]}))),
            Err(ValidationError::Invalid { field: "codigos.1".into() })
        );
    }

    #[test]
    fn wildcard_over_non_list() {
        let config = ValidationConfig::default();
        let inputs = body(json!({"items": "nope"}));

        // More path remains: always a failure.
        let deep_optional = config.validate_path("items.$.id", "integer", "body", "optional");
        assert_eq!(
            deep_optional.run(&inputs),
            Err(ValidationError::Invalid { field: "items".into() })
        );

        // Terminal wildcard, mandatory: failure.
        let terminal_mandatory = config.validate_path("items.$", "integer", "body", "mandatory");
        assert!(terminal_mandatory.run(&inputs).is_err());

        // Terminal wildcard, optional: vacuous success.
        let terminal_optional = config.validate_path("items.$", "integer", "body", "optional");
        assert_eq!(terminal_optional.run(&inputs), Ok(()));
    }

    #[test]
    fn nested_wildcards() {
        let config = ValidationConfig::default();
        let check = config.validate_path(
            "comisiones.$.horarios.$.inicio",
            "date",
            "body",
            "mandatory",
        );
        let inputs = body(json!({
            "comisiones": [
                {"horarios": [{"inicio": "2024-03-01T08:00:00Z"}]},
                {"horarios": [{"inicio": "2024-03-01T10:00:00Z"}, {"inicio": "mañana"}]}
            ]
        }));
        assert_eq!(
            check.run(&inputs),
            Err(ValidationError::Invalid {
                field: "comisiones.1.horarios.1.inicio".into()
            })
        );
    }

    #[test]
    fn path_checks_match_headers_case_insensitively() {
        let config = ValidationConfig::default();
        let check = config.validate_path("X-Api-Version", "integer", "header", "mandatory");
        let inputs = RequestInputs::new().with_header("x-api-version", "2");
        assert!(check.run(&inputs).is_ok());

        let inputs = RequestInputs::new().with_header("X-API-VERSION", "dos");
        assert_eq!(
            check.run(&inputs),
            Err(ValidationError::Invalid { field: "x-api-version".into() })
        );
        assert_matches!(check.run(&RequestInputs::new()), Err(ValidationError::Missing { .. }));
    }

    #[test]
    fn path_checks_read_query_bag() {
        let config = ValidationConfig::default();
        let check = config.validate_path("anio", "integer", "query", "mandatory");
        assert!(check.run(&RequestInputs::new().with_query("anio", "2024")).is_ok());
        assert_matches!(check.run(&RequestInputs::new()), Err(ValidationError::Missing { .. }));
    }
}
