//! Tests for structural equality, hashing and the resource union.

use std::collections::HashSet;

use rstest::rstest;

use clinical_model::domain::{
    Buildable, Builder, Element, Extensible, ModifierExtensible, ValidationPolicy,
};
use clinical_model::resource::{
    Account, AccountStatus, AdverseEvent, AdverseEventActuality, AdverseEventStatus,
    DomainResourceBuilder, Resource,
};
use clinical_model::types::{Extension, FhirBoolean, FhirDecimal, FhirString, Id, Reference};

const NOTE_URL: &str = "http://example.org/fhir/StructureDefinition/note";

fn named_account(name: &str) -> Account {
    Account::builder()
        .status(AccountStatus::Active)
        .name(FhirString::of(name).unwrap())
        .build()
        .unwrap()
}

fn note(text: &str) -> Extension {
    Extension::builder()
        .url(NOTE_URL)
        .value(FhirString::of(text).unwrap())
        .build()
        .unwrap()
}

#[rstest]
fn given_independently_built_records_when_compared_then_equal_and_same_hash() {
    // Arrange
    let a = named_account("Ward 3");
    let b = named_account("Ward 3");

    // Act
    let set: HashSet<Account> = [a.clone(), b.clone()].into_iter().collect();

    // Assert
    assert_eq!(a, b);
    assert_eq!(a.stable_hash(), b.stable_hash());
    assert_eq!(set.len(), 1);
}

#[rstest]
fn given_records_differing_in_one_field_when_compared_then_not_equal() {
    // Arrange
    let a = named_account("Ward 3");
    let b = named_account("Ward 4");

    // Assert
    assert_ne!(a, b);
    assert_ne!(a.stable_hash(), b.stable_hash());
}

#[rstest]
fn given_hash_when_read_twice_then_value_is_stable() {
    // Arrange
    let a = named_account("Ward 3");

    // Act
    let first = a.stable_hash();
    let second = a.stable_hash();

    // Assert
    assert_eq!(first, second);
    // cached hash is not part of equality
    assert_eq!(a, named_account("Ward 3"));
}

#[rstest]
fn given_list_order_when_different_then_records_not_equal() {
    // Arrange
    let p = Reference::to("Patient", "p1").unwrap();
    let o = Reference::to("Organization", "o1").unwrap();

    // Act
    let a = Account::builder()
        .status(AccountStatus::Active)
        .subject([p.clone(), o.clone()])
        .build()
        .unwrap();
    let b = Account::builder()
        .status(AccountStatus::Active)
        .subject([o, p])
        .build()
        .unwrap();

    // Assert
    assert_ne!(a, b);
}

#[rstest]
#[case("1.0", "1.00", false)]
#[case("1.50", "1.50", true)]
#[case("-0.5", "-0.50", false)]
fn given_decimals_when_compared_then_precision_is_significant(
    #[case] left: &str,
    #[case] right: &str,
    #[case] equal: bool,
) {
    // Arrange
    let a = FhirDecimal::parse(left).unwrap();
    let b = FhirDecimal::parse(right).unwrap();

    // Act
    let same_hash = a.stable_hash() == b.stable_hash();

    // Assert
    assert_eq!(a == b, equal);
    assert_eq!(same_hash, equal);
    assert_eq!(a.value_text().as_deref(), Some(left));
}

#[rstest]
fn given_extensions_when_built_then_lookup_by_url_and_modifier_flag() {
    // Arrange
    let account = Account::builder()
        .status(AccountStatus::OnHold)
        .extension([note("first"), note("second")])
        .modifier_extension([Extension::builder()
            .url("http://example.org/fhir/StructureDefinition/frozen")
            .value(FhirBoolean::from(true))
            .build()
            .unwrap()])
        .build()
        .unwrap();

    // Act
    let notes: Vec<_> = account
        .extensions_by_url(NOTE_URL)
        .filter_map(|ext| ext.value())
        .filter_map(|value| value.get::<FhirString>())
        .filter_map(|s| s.as_str())
        .collect();

    // Assert
    assert_eq!(notes, vec!["first", "second"]);
    assert!(account.is_modified());
    let cleared = account
        .to_builder()
        .set_modifier_extension(Vec::<Extension>::new())
        .build()
        .unwrap();
    assert!(!cleared.is_modified());
}

#[rstest]
fn given_resource_union_when_downcast_then_concrete_record_is_returned() {
    // Arrange
    let account = Account::builder()
        .id(Id::of("acc-7").unwrap())
        .status(AccountStatus::Active)
        .build()
        .unwrap();

    // Act
    let resource = Resource::from(account.clone());

    // Assert
    assert_eq!(resource.resource_type(), "Account");
    assert_eq!(resource.id(), Some("acc-7"));
    assert_eq!(resource.get::<Account>(), Some(&account));
    assert!(resource.get::<AdverseEvent>().is_none());
    assert_eq!(resource.stable_hash(), account.stable_hash());
}

#[rstest]
fn given_contained_resources_when_built_then_kept_in_order() {
    // Arrange
    let event = AdverseEvent::builder()
        .status(AdverseEventStatus::Completed)
        .actuality(AdverseEventActuality::Actual)
        .subject(Reference::untyped("#patient").unwrap())
        .build()
        .unwrap();

    // Act
    let account = Account::builder()
        .status(AccountStatus::Active)
        .contained([Resource::from(event.clone()), Resource::from(named_account("Ward 3"))])
        .build()
        .unwrap();

    // Assert
    let types: Vec<_> = account
        .common()
        .contained()
        .iter()
        .map(Resource::resource_type)
        .collect();
    assert_eq!(types, vec!["AdverseEvent", "Account"]);
    assert_eq!(account.common().contained()[0].get::<AdverseEvent>(), Some(&event));
}

#[rstest]
fn given_invalid_record_when_rebuilt_with_validation_then_error_surfaces() {
    // Arrange
    let trusted = Account::builder()
        .name(FhirString::of("no status").unwrap())
        .validating(false)
        .build()
        .unwrap();
    let resource = Resource::from(trusted);

    // Act
    let checked = resource.rebuild(ValidationPolicy::default());
    let unchecked = resource.rebuild(ValidationPolicy::trusted());

    // Assert
    assert_eq!(checked.unwrap_err().field(), Some("status"));
    assert_eq!(unchecked.unwrap(), resource);
}
