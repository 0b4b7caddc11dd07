//! Tests for the builder protocol: round trips, overrides and emptiness.

use rstest::{fixture, rstest};

use clinical_model::domain::{Buildable, Builder, Element, ElementBuilder, Extensible};
use clinical_model::resource::{
    Account, AccountStatus, AdverseEvent, AdverseEventActuality, AdverseEventStatus,
    DomainResourceBuilder, Guarantor,
};
use clinical_model::types::{
    CodeableConcept, Coding, FhirBoolean, FhirDateTime, FhirString, Id, Identifier, Period,
    Reference, Uri,
};
use clinical_model::util::testing;

#[fixture]
fn account() -> Account {
    testing::init_test_setup();
    let guarantor = Guarantor::builder()
        .party(Reference::to("Organization", "insurer").unwrap())
        .on_hold(FhirBoolean::from(false))
        .build()
        .unwrap();
    Account::builder()
        .id(Id::of("acc-1").unwrap())
        .identifier([Identifier::of("urn:example:accounts", "A-100").unwrap()])
        .status(AccountStatus::Active)
        .name(FhirString::of("Inpatient stay").unwrap())
        .subject([
            Reference::to("Patient", "p1").unwrap(),
            Reference::to("Location", "ward-3").unwrap(),
        ])
        .service_period(
            Period::builder()
                .start(FhirDateTime::parse("2024-01-01").unwrap())
                .build()
                .unwrap(),
        )
        .guarantor([guarantor])
        .build()
        .unwrap()
}

#[rstest]
fn given_built_account_when_round_tripped_then_equal_with_same_hash(account: Account) {
    // Act
    let rebuilt = account.to_builder().build().unwrap();

    // Assert
    assert_eq!(rebuilt, account);
    assert_eq!(rebuilt.stable_hash(), account.stable_hash());
}

#[rstest]
fn given_account_when_overriding_one_field_then_others_are_kept(account: Account) {
    // Act
    let renamed = account
        .to_builder()
        .name(FhirString::of("Outpatient visit").unwrap())
        .build()
        .unwrap();

    // Assert
    assert_eq!(
        renamed.name().and_then(|n| n.as_str()),
        Some("Outpatient visit")
    );
    assert_eq!(renamed.subject(), account.subject());
    assert_eq!(renamed.guarantor(), account.guarantor());
    assert_eq!(renamed.common().id(), Some("acc-1"));
    assert_ne!(renamed, account);
    // source record is untouched
    assert_eq!(
        account.name().and_then(|n| n.as_str()),
        Some("Inpatient stay")
    );
}

#[rstest]
fn given_list_setter_when_appending_then_existing_members_are_kept(account: Account) {
    // Act
    let extended = account
        .to_builder()
        .subject([Reference::to("Device", "pump-7").unwrap()])
        .build()
        .unwrap();

    // Assert
    let targets: Vec<_> = extended
        .subject()
        .iter()
        .filter_map(Reference::target_type_name)
        .collect();
    assert_eq!(targets, vec!["Patient", "Location", "Device"]);
}

#[rstest]
fn given_list_setter_when_replacing_then_previous_members_are_dropped(account: Account) {
    // Act
    let replaced = account
        .to_builder()
        .set_subject([Reference::to("Organization", "o1").unwrap()])
        .build()
        .unwrap();

    // Assert
    assert_eq!(replaced.subject().len(), 1);
    assert_eq!(replaced.subject()[0].target_type_name(), Some("Organization"));
}

#[rstest]
fn given_fresh_builder_when_checked_then_not_populated() {
    // Arrange
    let builder = Account::builder();

    // Act
    let populated = builder.clone().status(AccountStatus::Inactive);

    // Assert
    assert!(!builder.is_populated());
    assert!(populated.is_populated());
}

#[rstest]
fn given_only_status_when_building_account_then_succeeds_with_content() {
    // Act
    let account = Account::builder()
        .status(AccountStatus::Active)
        .build()
        .unwrap();

    // Assert
    assert!(account.has_content());
    assert_eq!(
        account.status().and_then(|s| s.code()),
        Some(AccountStatus::Active)
    );
    assert_eq!(account.to_builder().build().unwrap(), account);
}

#[rstest]
fn given_nested_builders_when_building_datatypes_then_values_are_kept() {
    // Arrange
    let coding = Coding::builder()
        .system(Uri::of("http://terminology.hl7.org/CodeSystem/account-type").unwrap())
        .code(clinical_model::types::Code::of("PBILLACCT").unwrap())
        .display(FhirString::of("patient billing account").unwrap())
        .build()
        .unwrap();

    // Act
    let concept = CodeableConcept::builder()
        .coding([coding])
        .text(FhirString::of("Patient billing").unwrap())
        .build()
        .unwrap();

    // Assert
    assert!(concept.has_coding(
        "http://terminology.hl7.org/CodeSystem/account-type",
        "PBILLACCT"
    ));
    assert!(!concept.has_coding("http://example.org", "PBILLACCT"));
}

#[rstest]
fn given_element_id_when_set_and_cleared_then_builder_tracks_it() {
    // Arrange
    let period = Period::builder()
        .id("p-1")
        .start(FhirDateTime::parse("2024-03-01").unwrap())
        .build()
        .unwrap();

    // Act
    let cleared = period.to_builder().clear_id().build().unwrap();

    // Assert
    assert_eq!(period.element_id(), Some("p-1"));
    assert_eq!(cleared.element_id(), None);
    assert_ne!(period, cleared);
}

#[rstest]
fn given_adverse_event_when_rebuilt_then_choice_is_preserved() {
    // Arrange
    let event = AdverseEvent::builder()
        .status(AdverseEventStatus::Completed)
        .actuality(AdverseEventActuality::Actual)
        .subject(Reference::to("Patient", "p1").unwrap())
        .occurrence(FhirDateTime::parse("2024-05-01T10:30:00+02:00").unwrap())
        .build()
        .unwrap();

    // Act
    let rebuilt = event.to_builder().build().unwrap();

    // Assert
    assert_eq!(rebuilt.occurrence(), event.occurrence());
    assert_eq!(rebuilt, event);
}
