//! Tests for binding metadata: registry lookups and constraint evaluation.

use std::fmt;

use rstest::rstest;

use clinical_model::domain::{
    evaluate_constraints, Buildable, Builder, Constraint, ConstraintEvaluator, ConstraintLevel,
    DataKind, Element, FieldShape, ModelType,
};
use clinical_model::registry;
use clinical_model::types::{FhirDateTime, Period, Reference};

#[rstest]
#[case("Account", "status", true)]
#[case("AdverseEvent", "status", true)]
#[case("AdverseEvent", "subject", true)]
#[case("AdverseEvent", "encounter", false)]
#[case("Account.Guarantor", "party", true)]
fn given_element_when_looked_up_then_required_flag_matches(
    #[case] type_name: &str,
    #[case] element: &str,
    #[case] required: bool,
) {
    // Act
    let info = registry::element_info(type_name, element).unwrap();

    // Assert
    assert_eq!(info.required, required);
}

#[rstest]
fn given_choice_element_when_looked_up_then_alternatives_and_names_are_listed() {
    // Act
    let kinds = registry::choice_element_types("AdverseEvent", "occurrence");
    let info = registry::element_info("AdverseEvent", "occurrence").unwrap();

    // Assert
    assert!(registry::is_choice_element("AdverseEvent", "occurrence"));
    assert!(!registry::is_choice_element("AdverseEvent", "subject"));
    assert_eq!(kinds, &[DataKind::DateTime, DataKind::Period]);
    assert_eq!(info.shape, FieldShape::Choice);
    assert_eq!(
        info.choice_element_names(),
        vec!["occurrenceDateTime", "occurrencePeriod"]
    );
}

#[rstest]
fn given_serialized_choice_name_when_resolved_then_element_and_kind_found() {
    // Arrange
    let info = registry::type_info("Extension").unwrap();

    // Act
    let resolved = info.choice_element("valueCodeableConcept");

    // Assert
    let (element, kind) = resolved.unwrap();
    assert_eq!(element.name, "value");
    assert_eq!(kind, DataKind::CodeableConcept);
    assert!(info.choice_element("valueTiming").is_none());
}

#[rstest]
fn given_reference_element_when_looked_up_then_targets_are_listed() {
    // Act
    let owner = registry::reference_target_types("Account", "owner");
    let unknown = registry::reference_target_types("Account", "nonexistent");

    // Assert
    assert_eq!(owner, &["Organization"]);
    assert!(unknown.is_empty());
}

#[rstest]
fn given_registry_when_listing_then_resources_and_datatypes_are_present() {
    // Act
    let names = registry::type_names();

    // Assert
    for expected in ["Account", "AdverseEvent", "Period", "Reference", "dateTime", "code"] {
        assert!(names.contains(&expected), "{expected}");
    }
    assert_eq!(registry::resource_type_names(), &["Account", "AdverseEvent"]);
    assert!(registry::type_info("Timing").is_none());
}

#[rstest]
fn given_required_elements_when_listed_then_in_declaration_order() {
    // Act
    let names: Vec<_> = clinical_model::resource::AdverseEvent::type_info()
        .required_elements()
        .map(|e| e.name)
        .collect();

    // Assert
    assert_eq!(names, vec!["status", "actuality", "subject"]);
}

#[derive(Debug)]
struct EngineError;

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("engine unavailable")
    }
}

impl std::error::Error for EngineError {}

/// Evaluates only `per-1`, comparing start and end lexically.
struct PeriodOrderEngine;

impl ConstraintEvaluator for PeriodOrderEngine {
    type Error = EngineError;

    fn evaluate(&self, constraint: &Constraint, target: &dyn Element) -> Result<bool, EngineError> {
        if constraint.id != "per-1" {
            return Err(EngineError);
        }
        let period = target.downcast_ref::<Period>().ok_or(EngineError)?;
        let start = period.start().and_then(Element::value_text);
        let end = period.end().and_then(Element::value_text);
        Ok(match (start, end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        })
    }
}

fn period(start: &str, end: &str) -> Period {
    Period::builder()
        .start(FhirDateTime::parse(start).unwrap())
        .end(FhirDateTime::parse(end).unwrap())
        .build()
        .unwrap()
}

#[rstest]
fn given_ordered_period_when_constraints_evaluated_then_no_issues() {
    // Act
    let issues = evaluate_constraints(&period("2024-01-01", "2024-02-01"), &PeriodOrderEngine);

    // Assert
    assert!(issues.unwrap().is_empty());
}

#[rstest]
fn given_reversed_period_when_constraints_evaluated_then_issue_reported() {
    // Arrange
    let reversed = period("2024-03-01", "2024-02-01");

    // Act
    let issues = evaluate_constraints(&reversed, &PeriodOrderEngine).unwrap();

    // Assert
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].constraint_id, "per-1");
    assert_eq!(issues[0].level, ConstraintLevel::Rule);
    assert_eq!(issues[0].location, "(base)");
}

#[rstest]
fn given_engine_failure_when_constraints_evaluated_then_error_propagates() {
    // Arrange
    let reference = Reference::to("Patient", "p1").unwrap();

    // Act
    let result = evaluate_constraints(&reference, &PeriodOrderEngine);

    // Assert
    assert_eq!(result.unwrap_err().to_string(), "engine unavailable");
}
