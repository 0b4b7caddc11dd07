//! Build-time validation errors (no external dependencies beyond thiserror)

use thiserror::Error;

/// Rule violations detected while building a record.
///
/// Every variant names the offending element so callers can report a precise
/// location. A failed build never yields a partially valid instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required element: '{field}'")]
    MissingRequiredField { field: String },

    #[error("invalid type '{actual}' for choice element '{field}', expected one of [{allowed}]")]
    TypeMismatch {
        field: String,
        actual: String,
        allowed: String,
    },

    #[error("invalid reference target type '{actual}' for element '{field}', expected one of [{allowed}]")]
    InvalidReferenceTarget {
        field: String,
        actual: String,
        allowed: String,
    },

    #[error("element '{field}' contains an absent {element_kind} member")]
    NullListElement { field: String, element_kind: String },

    #[error("{type_name} must have a value or children")]
    EmptyRecord { type_name: String },

    #[error("invalid {type_name} value '{value}': {reason}")]
    InvalidValue {
        type_name: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    /// Name of the element the rule was violated on, if the rule is element-scoped.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingRequiredField { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::InvalidReferenceTarget { field, .. }
            | ValidationError::NullListElement { field, .. } => Some(field),
            ValidationError::EmptyRecord { .. } | ValidationError::InvalidValue { .. } => None,
        }
    }

    /// Short rule identifier, stable across message wording changes.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { .. } => "required",
            ValidationError::TypeMismatch { .. } => "choice-type",
            ValidationError::InvalidReferenceTarget { .. } => "reference-target",
            ValidationError::NullListElement { .. } => "list-member",
            ValidationError::EmptyRecord { .. } => "value-or-children",
            ValidationError::InvalidValue { .. } => "lexical",
        }
    }
}

/// Result type for build and validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
