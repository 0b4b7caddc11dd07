//! Binding metadata supplied alongside each generated node type.
//!
//! Validators read allow-lists and alternative sets from these declarations,
//! so a binding states each rule exactly once.

use serde::Serialize;

use crate::domain::choice::{choice_element_name, DataKind};
use crate::domain::element::Element;

/// Shape of a declared element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    Scalar,
    List,
    Choice,
}

/// One declared element of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementInfo {
    pub name: &'static str,
    /// Declared type name; `"*"` for choice elements.
    pub type_name: &'static str,
    pub shape: FieldShape,
    pub required: bool,
    pub summary: bool,
    pub choice_types: &'static [DataKind],
    pub reference_types: &'static [&'static str],
}

impl ElementInfo {
    pub const fn scalar(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            shape: FieldShape::Scalar,
            required: false,
            summary: false,
            choice_types: &[],
            reference_types: &[],
        }
    }

    pub const fn list(name: &'static str, type_name: &'static str) -> Self {
        Self {
            shape: FieldShape::List,
            ..Self::scalar(name, type_name)
        }
    }

    pub const fn choice(name: &'static str, choice_types: &'static [DataKind]) -> Self {
        Self {
            shape: FieldShape::Choice,
            choice_types,
            ..Self::scalar(name, "*")
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn summary(self) -> Self {
        Self {
            summary: true,
            ..self
        }
    }

    pub const fn references(self, reference_types: &'static [&'static str]) -> Self {
        Self {
            reference_types,
            ..self
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.shape == FieldShape::List
    }

    pub fn is_choice(&self) -> bool {
        self.shape == FieldShape::Choice
    }

    pub fn is_reference(&self) -> bool {
        self.type_name == "Reference"
    }

    /// Serialized names of every alternative, e.g. `occurrenceDateTime`.
    pub fn choice_element_names(&self) -> Vec<String> {
        self.choice_types
            .iter()
            .map(|kind| choice_element_name(self.name, *kind))
            .collect()
    }
}

/// Broad category of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Primitive,
    DataType,
    Backbone,
    Resource,
}

/// Declared shape of a node type: its elements in declaration order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TypeInfo {
    pub name: &'static str,
    pub category: TypeCategory,
    pub elements: &'static [ElementInfo],
    pub constraints: &'static [Constraint],
}

impl TypeInfo {
    pub fn element(&self, name: &str) -> Option<&'static ElementInfo> {
        self.elements.iter().find(|info| info.name == name)
    }

    /// Look up a choice element by its type-specific name (`occurrencePeriod`).
    pub fn choice_element(&self, serialized_name: &str) -> Option<(&'static ElementInfo, DataKind)> {
        self.elements
            .iter()
            .filter(|info| info.is_choice())
            .find_map(|info| {
                info.choice_types
                    .iter()
                    .find(|kind| choice_element_name(info.name, **kind) == serialized_name)
                    .map(|kind| (info, *kind))
            })
    }

    pub fn required_elements(&self) -> impl Iterator<Item = &'static ElementInfo> {
        self.elements.iter().filter(|info| info.required)
    }
}

/// Node types that publish binding metadata.
pub trait ModelType {
    fn type_info() -> &'static TypeInfo;
}

/// Severity of a declared constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintLevel {
    Rule,
    Warning,
}

/// A cross-field rule carried as metadata.
///
/// The core never interprets `expression`; an external engine implementing
/// [`ConstraintEvaluator`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub id: &'static str,
    pub level: ConstraintLevel,
    /// `"(base)"` for the node itself, otherwise a path below it.
    pub location: &'static str,
    pub description: &'static str,
    pub expression: &'static str,
    pub source: &'static str,
    /// Derived from a terminology binding rather than authored.
    pub generated: bool,
}

/// External constraint-expression engine.
pub trait ConstraintEvaluator {
    type Error: std::error::Error;

    /// `Ok(true)` when `target` satisfies `constraint`.
    fn evaluate(&self, constraint: &Constraint, target: &dyn Element) -> Result<bool, Self::Error>;
}

/// A constraint a built record did not satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintIssue {
    pub constraint_id: &'static str,
    pub level: ConstraintLevel,
    pub location: &'static str,
    pub description: &'static str,
}

/// Run every constraint declared for `T` against a built record.
pub fn evaluate_constraints<T, E>(target: &T, evaluator: &E) -> Result<Vec<ConstraintIssue>, E::Error>
where
    T: ModelType + Element,
    E: ConstraintEvaluator,
{
    let mut issues = Vec::new();
    for constraint in T::type_info().constraints {
        if !evaluator.evaluate(constraint, target)? {
            issues.push(ConstraintIssue {
                constraint_id: constraint.id,
                level: constraint.level,
                location: constraint.location,
                description: constraint.description,
            });
        }
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    static ELEMENTS: [ElementInfo; 3] = [
        ElementInfo::scalar("status", "code").required().summary(),
        ElementInfo::list("subject", "Reference").references(&["Patient"]),
        ElementInfo::choice("occurrence", &[DataKind::DateTime, DataKind::Period]),
    ];

    static INFO: TypeInfo = TypeInfo {
        name: "Sample",
        category: TypeCategory::Resource,
        elements: &ELEMENTS,
        constraints: &[],
    };

    #[test]
    fn element_builders_set_flags() {
        let status = INFO.element("status").unwrap();
        assert!(status.required && status.summary);
        assert!(INFO.element("subject").unwrap().is_repeating());
        assert!(INFO.element("subject").unwrap().is_reference());
        assert_eq!(INFO.required_elements().count(), 1);
    }

    #[test]
    fn choice_element_lookup_by_serialized_name() {
        let (info, kind) = INFO.choice_element("occurrencePeriod").unwrap();
        assert_eq!(info.name, "occurrence");
        assert_eq!(kind, DataKind::Period);
        assert!(INFO.choice_element("occurrenceString").is_none());
        assert_eq!(
            INFO.element("occurrence").unwrap().choice_element_names(),
            vec!["occurrenceDateTime", "occurrencePeriod"]
        );
    }
}
