//! Declarative request-input validation.
//!
//! Routes declare [`InputCheck`]s through an immutable [`ValidationConfig`]:
//! flat checks look a key up directly in one input bag, path checks walk a
//! pre-parsed dotted path (with a list wildcard) into nested JSON. Checks are
//! pure; the HTTP middleware in `academia-api` snapshots the request into
//! [`RequestInputs`] and runs them in order.

pub mod config;
pub mod evaluator;
pub mod inputs;
pub mod path;
pub mod primitives;
pub mod rules;

pub use config::ValidationConfig;
pub use evaluator::run_checks;
pub use inputs::RequestInputs;
pub use path::{FieldPath, Segment};
pub use rules::{Constraints, FieldType, InputCheck, InputSource, Requirement};

/// Why a request input (or the rule describing it) was rejected.
///
/// Every variant names the offending field or the deepest failing path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The route declared a malformed rule.
    #[error("Invalid validation rule for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    #[error("The field '{field}' is mandatory")]
    Missing { field: String },

    #[error("The field '{field}' has an invalid value")]
    Invalid { field: String },

    /// An intermediate segment of a nested path does not exist.
    #[error("The field '{field}' was not found")]
    NotFound { field: String },
}

impl ValidationError {
    /// Field key or concrete path the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::Configuration { field, .. }
            | Self::Missing { field }
            | Self::Invalid { field }
            | Self::NotFound { field } => field,
        }
    }

    /// Machine-readable identifier used in error envelopes.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            _ => "validation_error",
        }
    }
}
