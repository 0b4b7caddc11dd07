//! Tests for build-time validation: required fields, list members, choice
//! types, reference targets, lexical rules and the "not entirely empty" rule.

use rstest::rstest;

use clinical_model::domain::{
    require_value_or_children, BackboneBuilder, Buildable, Builder, Element, ElementBuilder,
    ValidationError, ValidationPolicy,
};
use clinical_model::resource::{
    Account, AccountStatus, AdverseEvent, AdverseEventActuality, AdverseEventStatus,
};
use clinical_model::types::{
    Code, CodeableConcept, DataValue, Extension, FhirBoolean, FhirDateTime, FhirString, Id,
    Identifier, Period, Reference, Uri,
};
use clinical_model::util::testing;

fn minimal_event() -> clinical_model::resource::AdverseEventBuilder {
    testing::init_test_setup();
    AdverseEvent::builder()
        .status(AdverseEventStatus::InProgress)
        .actuality(AdverseEventActuality::Potential)
        .subject(Reference::to("Patient", "p1").unwrap())
}

#[rstest]
fn given_account_without_status_when_building_then_missing_required_field() {
    // Arrange
    let builder = Account::builder().name(FhirString::of("Ward 3").unwrap());

    // Act
    let err = builder.build().unwrap_err();

    // Assert
    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            field: "status".into()
        }
    );
    assert_eq!(err.rule(), "required");
}

#[rstest]
fn given_account_without_status_when_not_validating_then_builds() {
    // Act
    let account = Account::builder()
        .name(FhirString::of("Ward 3").unwrap())
        .validating(false)
        .build()
        .unwrap();

    // Assert
    assert!(account.status().is_none());
}

#[rstest]
fn given_absent_list_member_when_building_then_null_list_element() {
    // Arrange
    let builder = Account::builder()
        .status(AccountStatus::Active)
        .identifier([Some(Identifier::of("urn:example", "1").unwrap()), None]);

    // Act
    let err = builder.build().unwrap_err();

    // Assert
    assert_eq!(
        err,
        ValidationError::NullListElement {
            field: "identifier".into(),
            element_kind: "Identifier".into(),
        }
    );
}

#[rstest]
fn given_absent_list_member_when_not_validating_then_member_is_dropped() {
    // Act
    let account = Account::builder()
        .status(AccountStatus::Active)
        .identifier([None, Some(Identifier::of("urn:example", "1").unwrap())])
        .validating(false)
        .build()
        .unwrap();

    // Assert
    assert_eq!(account.identifier().len(), 1);
}

#[rstest]
#[case::date_time(DataValue::from(FhirDateTime::parse("2024-05-01").unwrap()))]
#[case::period(DataValue::from(
    Period::builder()
        .start(FhirDateTime::parse("2024-05-01").unwrap())
        .build()
        .unwrap()
))]
fn given_declared_alternative_when_building_event_then_accepted(#[case] occurrence: DataValue) {
    // Arrange
    let expected = occurrence.kind();

    // Act
    let event = minimal_event().occurrence(occurrence).build().unwrap();

    // Assert
    assert_eq!(
        event.occurrence().map(clinical_model::domain::Choice::kind),
        Some(expected)
    );
}

#[rstest]
#[case::boolean(DataValue::from(FhirBoolean::from(true)), "boolean")]
#[case::string(DataValue::from(FhirString::of("last week").unwrap()), "string")]
fn given_undeclared_alternative_when_building_event_then_type_mismatch(
    #[case] occurrence: DataValue,
    #[case] actual: &str,
) {
    // Act
    let err = minimal_event().occurrence(occurrence).build().unwrap_err();

    // Assert
    assert_eq!(
        err,
        ValidationError::TypeMismatch {
            field: "occurrence".into(),
            actual: actual.into(),
            allowed: "dateTime, Period".into(),
        }
    );
    assert_eq!(err.rule(), "choice-type");
}

#[rstest]
fn given_disallowed_subject_type_when_building_event_then_invalid_reference_target() {
    // Act
    let err = minimal_event()
        .subject(Reference::to("Device", "d1").unwrap())
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(err.field(), Some("subject"));
    assert_eq!(err.rule(), "reference-target");
    match err {
        ValidationError::InvalidReferenceTarget { actual, allowed, .. } => {
            assert_eq!(actual, "Device");
            assert!(allowed.starts_with("Patient, Group"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn given_untyped_reference_when_lenient_then_accepted() {
    // Act
    let event = minimal_event()
        .subject(Reference::untyped("Patient/p1").unwrap())
        .build();

    // Assert
    assert!(event.is_ok());
}

#[rstest]
fn given_untyped_reference_when_strict_then_rejected() {
    // Act
    let err = minimal_event()
        .subject(Reference::untyped("Patient/p1").unwrap())
        .policy(ValidationPolicy::strict())
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(err.rule(), "reference-target");
    assert_eq!(err.field(), Some("subject"));
}

#[rstest]
fn given_reference_list_when_one_member_disallowed_then_rejected() {
    // Act
    let err = minimal_event()
        .resulting_effect([
            Reference::to("Condition", "c1").unwrap(),
            Reference::to("Patient", "p2").unwrap(),
        ])
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(
        err,
        ValidationError::InvalidReferenceTarget {
            field: "resultingEffect".into(),
            actual: "Patient".into(),
            allowed: "Condition, Observation".into(),
        }
    );
}

#[rstest]
fn given_empty_datatype_when_building_then_empty_record() {
    // Act
    let err = Period::builder().build().unwrap_err();

    // Assert
    assert_eq!(
        err,
        ValidationError::EmptyRecord {
            type_name: "Period".into()
        }
    );
    assert_eq!(err.field(), None);
}

#[rstest]
fn given_datatype_with_only_extension_when_building_then_valid() {
    // Arrange
    let note = Extension::builder()
        .url("http://example.org/fhir/StructureDefinition/note")
        .value(FhirString::of("estimated").unwrap())
        .build()
        .unwrap();

    // Act
    let period = Period::builder().extension([note]).build();

    // Assert
    assert!(period.is_ok());
}

#[rstest]
fn given_empty_datatype_when_not_validating_then_builds() {
    // Act
    let period = Period::builder().validating(false).build();

    // Assert
    assert!(period.is_ok());
}

#[rstest]
fn given_extension_with_url_only_when_building_then_empty_record() {
    // Act
    let err = Extension::builder()
        .url("http://example.org/fhir/StructureDefinition/note")
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(err.rule(), "value-or-children");
}

#[rstest]
fn given_extension_without_url_when_building_then_missing_required_field() {
    // Act
    let err = Extension::builder()
        .value(FhirString::of("note").unwrap())
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(err.field(), Some("url"));
}

#[rstest]
#[case::blank_string(FhirString::of("   ").map(|_| ()))]
#[case::id_with_space(Id::of("not an id").map(|_| ()))]
#[case::code_with_double_space(Code::of("a  b").map(|_| ()))]
#[case::uri_with_space(Uri::of("http://example.org/a b").map(|_| ()))]
#[case::bad_date_time(FhirDateTime::parse("2024-13-45").map(|_| ()))]
fn given_invalid_lexical_form_when_creating_primitive_then_invalid_value(
    #[case] result: Result<(), ValidationError>,
) {
    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.rule(), "lexical");
}

#[rstest]
fn given_required_backbone_field_missing_when_building_then_error_names_field() {
    // Arrange
    let guarantor = clinical_model::resource::Guarantor::builder()
        .on_hold(FhirBoolean::from(true));

    // Act
    let err = guarantor.build().unwrap_err();

    // Assert
    assert_eq!(err.field(), Some("party"));
}

#[rstest]
fn given_backbone_with_only_modifier_extension_when_checked_then_has_content() {
    // Arrange
    let frozen = Extension::builder()
        .url("http://example.org/fhir/StructureDefinition/frozen")
        .value(FhirBoolean::from(true))
        .build()
        .unwrap();

    // Act
    let modified = clinical_model::resource::Guarantor::builder()
        .modifier_extension([frozen])
        .validating(false)
        .build()
        .unwrap();
    let empty = clinical_model::resource::Guarantor::builder()
        .validating(false)
        .build()
        .unwrap();

    // Assert
    assert!(modified.has_content());
    assert!(require_value_or_children(&modified).is_ok());
    assert!(!empty.has_content());
    assert_eq!(
        require_value_or_children(&empty).unwrap_err().rule(),
        "value-or-children"
    );
}

#[rstest]
fn given_codeable_concept_with_absent_coding_when_building_then_null_list_element() {
    // Act
    let err = CodeableConcept::builder()
        .coding([None::<clinical_model::types::Coding>])
        .text(FhirString::of("fever").unwrap())
        .build()
        .unwrap_err();

    // Assert
    assert_eq!(err.rule(), "list-member");
}
