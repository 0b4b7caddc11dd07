//! Choice resolver: closed alternative sets and reference target allow-lists.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

use crate::domain::builder::ValidationPolicy;
use crate::domain::error::{ValidationError, ValidationResult};
use crate::domain::visitor::Visitor;
use crate::types::{DataValue, Reference};

/// Concrete datatype names a choice element may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataKind {
    Boolean,
    Integer,
    Decimal,
    String,
    Uri,
    Code,
    Id,
    DateTime,
    Coding,
    CodeableConcept,
    Identifier,
    Period,
    Reference,
}

impl DataKind {
    pub const ALL: &'static [DataKind] = &[
        DataKind::Boolean,
        DataKind::Integer,
        DataKind::Decimal,
        DataKind::String,
        DataKind::Uri,
        DataKind::Code,
        DataKind::Id,
        DataKind::DateTime,
        DataKind::Coding,
        DataKind::CodeableConcept,
        DataKind::Identifier,
        DataKind::Period,
        DataKind::Reference,
    ];

    /// Schema type name; primitives are lower camel case.
    pub fn name(self) -> &'static str {
        match self {
            DataKind::Boolean => "boolean",
            DataKind::Integer => "integer",
            DataKind::Decimal => "decimal",
            DataKind::String => "string",
            DataKind::Uri => "uri",
            DataKind::Code => "code",
            DataKind::Id => "id",
            DataKind::DateTime => "dateTime",
            DataKind::Coding => "Coding",
            DataKind::CodeableConcept => "CodeableConcept",
            DataKind::Identifier => "Identifier",
            DataKind::Period => "Period",
            DataKind::Reference => "Reference",
        }
    }

    pub fn from_name(name: &str) -> Option<DataKind> {
        DataKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn is_primitive(self) -> bool {
        self.name().starts_with(|c: char| c.is_ascii_lowercase())
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sum type over the declared alternatives of one choice element.
///
/// Values arrive as an open [`DataValue`] (from a builder setter or a
/// decoder) and are narrowed with [`resolve_choice`].
pub trait Choice: Sized {
    const ALTERNATIVES: &'static [DataKind];

    fn kind(&self) -> DataKind;

    fn into_value(self) -> DataValue;

    /// `None` when the value's kind is not one of [`Choice::ALTERNATIVES`].
    fn from_value(value: DataValue) -> Option<Self>;

    /// Run the five-phase contract for the one alternative held.
    ///
    /// `name` is already the type-specific element name (`occurrencePeriod`).
    fn accept_alternative<V: Visitor + ?Sized>(
        &self,
        name: &str,
        visitor: &mut V,
    ) -> Result<(), V::Error>;
}

/// Serialized name of a choice element for a concrete alternative.
///
/// `choice_element_name("occurrence", DataKind::DateTime) == "occurrenceDateTime"`
pub fn choice_element_name(name: &str, kind: DataKind) -> String {
    let type_name = kind.name();
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", name, first.to_ascii_uppercase(), chars.as_str()),
        None => name.to_string(),
    }
}

/// Reject a value whose concrete kind is not a declared alternative.
pub fn validate_choice(
    value: Option<&DataValue>,
    field: &str,
    alternatives: &[DataKind],
) -> ValidationResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let kind = value.kind();
    if alternatives.contains(&kind) {
        return Ok(());
    }
    Err(ValidationError::TypeMismatch {
        field: field.to_string(),
        actual: kind.name().to_string(),
        allowed: alternatives.iter().map(|k| k.name()).join(", "),
    })
}

/// Validate and narrow an open value into the typed choice `C`.
///
/// With validation disabled a value outside the alternatives cannot be
/// represented; it is dropped with a warning.
pub fn resolve_choice<C: Choice>(
    value: Option<DataValue>,
    field: &str,
    policy: ValidationPolicy,
) -> ValidationResult<Option<C>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if policy.validating {
        validate_choice(Some(&value), field, C::ALTERNATIVES)?;
    }
    let kind = value.kind();
    match C::from_value(value) {
        Some(choice) => Ok(Some(choice)),
        None => {
            warn!(field, kind = kind.name(), "dropping choice value outside declared alternatives");
            Ok(None)
        }
    }
}

/// Check the declared target type of a reference against an allow-list.
///
/// Only the type name carried on the reference is checked; the target is
/// never resolved. References without a declared type pass, as does any
/// reference when `allowed` is empty.
pub fn validate_reference_target(
    reference: Option<&Reference>,
    field: &str,
    allowed: &[&str],
) -> ValidationResult<()> {
    check_reference_target(reference, field, allowed, ValidationPolicy::default())
}

/// [`validate_reference_target`] honoring the policy's treatment of untyped references.
pub fn check_reference_target(
    reference: Option<&Reference>,
    field: &str,
    allowed: &[&str],
    policy: ValidationPolicy,
) -> ValidationResult<()> {
    let Some(reference) = reference else {
        return Ok(());
    };
    if allowed.is_empty() {
        return Ok(());
    }
    match reference.target_type_name() {
        Some(type_name) if allowed.contains(&type_name) => Ok(()),
        Some(type_name) => Err(invalid_target(field, type_name, allowed)),
        None if policy.lenient_untyped_references => Ok(()),
        None => Err(invalid_target(field, "<untyped>", allowed)),
    }
}

/// [`check_reference_target`] applied to every member of a reference list.
pub fn check_reference_targets<'a>(
    references: impl IntoIterator<Item = &'a Reference>,
    field: &str,
    allowed: &[&str],
    policy: ValidationPolicy,
) -> ValidationResult<()> {
    references
        .into_iter()
        .try_for_each(|reference| check_reference_target(Some(reference), field, allowed, policy))
}

fn invalid_target(field: &str, actual: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::InvalidReferenceTarget {
        field: field.to_string(),
        actual: actual.to_string(),
        allowed: allowed.iter().join(", "),
    }
}
