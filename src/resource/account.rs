//! Account: a financial tool for tracking value accrued for a particular purpose.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_list, accept_opt, check_reference_target, check_reference_targets, memo_hash,
    require_non_null, require_value_or_children, walk, BackboneBuilder, BackboneBuilderCore,
    BackboneCommon, Buildable, Builder, Element, ElementBuilder, ElementBuilderCore, ElementInfo,
    HashMemo, ListSlot, ModelType, TypeCategory, TypeInfo, ValidationPolicy, ValidationResult,
    Visitable, Visitor,
};
use crate::macros::{impl_modifier_extensible, impl_node_hash};
use crate::resource::codes::AccountStatus;
use crate::resource::{DomainResourceBuilder, DomainResourceBuilderCore, DomainResourceCommon};
use crate::types::{
    CodeableConcept, Enumerated, FhirBoolean, FhirString, Identifier, Period, Reference,
};

const SUBJECT_TARGETS: &[&str] = &[
    "Patient",
    "Device",
    "Practitioner",
    "PractitionerRole",
    "Location",
    "HealthcareService",
    "Organization",
];
const OWNER_TARGETS: &[&str] = &["Organization"];
const PARTY_TARGETS: &[&str] = &["Patient", "RelatedPerson", "Organization"];

static ELEMENTS: [ElementInfo; 9] = [
    ElementInfo::list("identifier", "Identifier").summary(),
    ElementInfo::scalar("status", "code").required().summary(),
    ElementInfo::scalar("type", "CodeableConcept").summary(),
    ElementInfo::scalar("name", "string").summary(),
    ElementInfo::list("subject", "Reference")
        .summary()
        .references(SUBJECT_TARGETS),
    ElementInfo::scalar("servicePeriod", "Period").summary(),
    ElementInfo::scalar("owner", "Reference")
        .summary()
        .references(OWNER_TARGETS),
    ElementInfo::scalar("description", "string").summary(),
    ElementInfo::list("guarantor", "Account.Guarantor"),
];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "Account",
    category: TypeCategory::Resource,
    elements: &ELEMENTS,
    constraints: &[],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub(crate) common: DomainResourceCommon,
    identifier: Vec<Identifier>,
    status: Option<Enumerated<AccountStatus>>,
    type_: Option<CodeableConcept>,
    name: Option<FhirString>,
    subject: Vec<Reference>,
    service_period: Option<Period>,
    owner: Option<Reference>,
    description: Option<FhirString>,
    guarantor: Vec<Guarantor>,
    memo: HashMemo,
}

impl Account {
    pub fn common(&self) -> &DomainResourceCommon {
        &self.common
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    /// Always present on a validated build.
    pub fn status(&self) -> Option<&Enumerated<AccountStatus>> {
        self.status.as_ref()
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn name(&self) -> Option<&FhirString> {
        self.name.as_ref()
    }

    pub fn subject(&self) -> &[Reference] {
        &self.subject
    }

    pub fn service_period(&self) -> Option<&Period> {
        self.service_period.as_ref()
    }

    pub fn owner(&self) -> Option<&Reference> {
        self.owner.as_ref()
    }

    pub fn description(&self) -> Option<&FhirString> {
        self.description.as_ref()
    }

    pub fn guarantor(&self) -> &[Guarantor] {
        &self.guarantor
    }
}

impl Element for Account {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || !self.identifier.is_empty()
            || self.status.is_some()
            || self.type_.is_some()
            || self.name.is_some()
            || !self.subject.is_empty()
            || self.service_period.is_some()
            || self.owner.is_some()
            || self.description.is_some()
            || !self.guarantor.is_empty()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                TYPE_INFO.name,
                &self.common,
                &self.identifier,
                &self.status,
                &self.type_,
                &self.name,
                &self.subject,
                &self.service_period,
                &self.owner,
                &self.description,
                &self.guarantor,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Account {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_list(&self.identifier, "identifier", "Identifier", visitor)?;
            accept_opt(&self.status, "status", visitor)?;
            accept_opt(&self.type_, "type", visitor)?;
            accept_opt(&self.name, "name", visitor)?;
            accept_list(&self.subject, "subject", "Reference", visitor)?;
            accept_opt(&self.service_period, "servicePeriod", visitor)?;
            accept_opt(&self.owner, "owner", visitor)?;
            accept_opt(&self.description, "description", visitor)?;
            accept_list(&self.guarantor, "guarantor", "Guarantor", visitor)
        })
    }
}

impl ModelType for Account {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(Account, Guarantor);
impl_modifier_extensible!(Account, Guarantor);

impl Buildable for Account {
    type Builder = AccountBuilder;

    fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    fn to_builder(&self) -> AccountBuilder {
        AccountBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountBuilder {
    common: DomainResourceBuilderCore,
    identifier: ListSlot<Identifier>,
    status: Option<Enumerated<AccountStatus>>,
    type_: Option<CodeableConcept>,
    name: Option<FhirString>,
    subject: ListSlot<Reference>,
    service_period: Option<Period>,
    owner: Option<Reference>,
    description: Option<FhirString>,
    guarantor: ListSlot<Guarantor>,
}

impl AccountBuilder {
    pub fn identifier<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Identifier>>,
    {
        self.identifier.append(items);
        self
    }

    pub fn set_identifier<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Identifier>>,
    {
        self.identifier.replace(items);
        self
    }

    pub fn status(mut self, status: impl Into<Option<AccountStatus>>) -> Self {
        let status: Option<AccountStatus> = status.into();
        self.status = status.map(Enumerated::from);
        self
    }

    /// Set the status element itself, keeping its id and extensions.
    pub fn status_element(mut self, status: impl Into<Option<Enumerated<AccountStatus>>>) -> Self {
        self.status = status.into();
        self
    }

    pub fn type_(mut self, type_: impl Into<Option<CodeableConcept>>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn name(mut self, name: impl Into<Option<FhirString>>) -> Self {
        self.name = name.into();
        self
    }

    /// Append subjects.
    pub fn subject<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Reference>>,
    {
        self.subject.append(items);
        self
    }

    pub fn set_subject<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Reference>>,
    {
        self.subject.replace(items);
        self
    }

    pub fn service_period(mut self, service_period: impl Into<Option<Period>>) -> Self {
        self.service_period = service_period.into();
        self
    }

    pub fn owner(mut self, owner: impl Into<Option<Reference>>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn description(mut self, description: impl Into<Option<FhirString>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn guarantor<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Guarantor>>,
    {
        self.guarantor.append(items);
        self
    }

    pub fn set_guarantor<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Guarantor>>,
    {
        self.guarantor.replace(items);
        self
    }
}

impl From<&Account> for AccountBuilder {
    fn from(account: &Account) -> Self {
        Self {
            common: DomainResourceBuilderCore::from_common(&account.common),
            identifier: ListSlot::seeded(&account.identifier),
            status: account.status.clone(),
            type_: account.type_.clone(),
            name: account.name.clone(),
            subject: ListSlot::seeded(&account.subject),
            service_period: account.service_period.clone(),
            owner: account.owner.clone(),
            description: account.description.clone(),
            guarantor: ListSlot::seeded(&account.guarantor),
        }
    }
}

impl DomainResourceBuilder for AccountBuilder {
    fn resource_core(&mut self) -> &mut DomainResourceBuilderCore {
        &mut self.common
    }
}

impl Builder for AccountBuilder {
    type Output = Account;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.common.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.common.is_populated()
            || !self.identifier.is_empty()
            || self.status.is_some()
            || self.type_.is_some()
            || self.name.is_some()
            || !self.subject.is_empty()
            || self.service_period.is_some()
            || self.owner.is_some()
            || self.description.is_some()
            || !self.guarantor.is_empty()
    }

    #[instrument(level = "debug", skip(self))]
    fn build(self) -> ValidationResult<Account> {
        let policy = self.common.policy();
        let validating = policy.validating;
        let common = self.common.freeze()?;
        let identifier = self
            .identifier
            .freeze("identifier", "Identifier", validating)?;
        let subject = self.subject.freeze("subject", "Reference", validating)?;
        let guarantor = self.guarantor.freeze("guarantor", "Guarantor", validating)?;
        if validating {
            require_non_null(&self.status, "status")?;
            check_reference_targets(&subject, "subject", SUBJECT_TARGETS, policy)?;
            check_reference_target(self.owner.as_ref(), "owner", OWNER_TARGETS, policy)?;
        }
        let built = Account {
            common,
            identifier,
            status: self.status,
            type_: self.type_,
            name: self.name,
            subject,
            service_period: self.service_period,
            owner: self.owner,
            description: self.description,
            guarantor,
            memo: HashMemo::new(),
        };
        debug!(type_name = TYPE_INFO.name, id = ?built.common.id(), "built");
        Ok(built)
    }
}

static GUARANTOR_ELEMENTS: [ElementInfo; 3] = [
    ElementInfo::scalar("party", "Reference")
        .required()
        .references(PARTY_TARGETS),
    ElementInfo::scalar("onHold", "boolean"),
    ElementInfo::scalar("period", "Period"),
];

static GUARANTOR_INFO: TypeInfo = TypeInfo {
    name: "Account.Guarantor",
    category: TypeCategory::Backbone,
    elements: &GUARANTOR_ELEMENTS,
    constraints: &[],
};

/// A party responsible for paying the account's charges, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarantor {
    common: BackboneCommon,
    party: Option<Reference>,
    on_hold: Option<FhirBoolean>,
    period: Option<Period>,
    memo: HashMemo,
}

impl Guarantor {
    pub fn party(&self) -> Option<&Reference> {
        self.party.as_ref()
    }

    /// Credit or other hold applied to this guarantor.
    pub fn on_hold(&self) -> Option<&FhirBoolean> {
        self.on_hold.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }
}

impl Element for Guarantor {
    fn type_name(&self) -> &'static str {
        GUARANTOR_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || self.party.is_some()
            || self.on_hold.is_some()
            || self.period.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                GUARANTOR_INFO.name,
                &self.common,
                &self.party,
                &self.on_hold,
                &self.period,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Guarantor {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.party, "party", visitor)?;
            accept_opt(&self.on_hold, "onHold", visitor)?;
            accept_opt(&self.period, "period", visitor)
        })
    }
}

impl ModelType for Guarantor {
    fn type_info() -> &'static TypeInfo {
        &GUARANTOR_INFO
    }
}

impl Buildable for Guarantor {
    type Builder = GuarantorBuilder;

    fn builder() -> GuarantorBuilder {
        GuarantorBuilder::default()
    }

    fn to_builder(&self) -> GuarantorBuilder {
        GuarantorBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuarantorBuilder {
    core: BackboneBuilderCore,
    party: Option<Reference>,
    on_hold: Option<FhirBoolean>,
    period: Option<Period>,
}

impl GuarantorBuilder {
    pub fn party(mut self, party: impl Into<Option<Reference>>) -> Self {
        self.party = party.into();
        self
    }

    pub fn on_hold(mut self, on_hold: impl Into<Option<FhirBoolean>>) -> Self {
        self.on_hold = on_hold.into();
        self
    }

    pub fn period(mut self, period: impl Into<Option<Period>>) -> Self {
        self.period = period.into();
        self
    }
}

impl From<&Guarantor> for GuarantorBuilder {
    fn from(guarantor: &Guarantor) -> Self {
        Self {
            core: BackboneBuilderCore::from_common(&guarantor.common),
            party: guarantor.party.clone(),
            on_hold: guarantor.on_hold.clone(),
            period: guarantor.period.clone(),
        }
    }
}

impl ElementBuilder for GuarantorBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        self.core.element_mut()
    }
}

impl BackboneBuilder for GuarantorBuilder {
    fn backbone_core(&mut self) -> &mut BackboneBuilderCore {
        &mut self.core
    }
}

impl Builder for GuarantorBuilder {
    type Output = Guarantor;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.element_mut().policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated()
            || self.party.is_some()
            || self.on_hold.is_some()
            || self.period.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Guarantor> {
        let policy = self.core.policy();
        if policy.validating {
            require_non_null(&self.party, "party")?;
            check_reference_target(self.party.as_ref(), "party", PARTY_TARGETS, policy)?;
        }
        let built = Guarantor {
            common: self.core.freeze()?,
            party: self.party,
            on_hold: self.on_hold,
            period: self.period,
            memo: HashMemo::new(),
        };
        if policy.validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = GUARANTOR_INFO.name, "built");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn guarantor_requires_party() {
        let err = Guarantor::builder()
            .on_hold(FhirBoolean::from(true))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                field: "party".into()
            }
        );
    }

    #[test]
    fn guarantor_party_must_be_allowed_type() {
        let err = Guarantor::builder()
            .party(Reference::to("Device", "d1").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.rule(), "reference-target");
    }

    #[test]
    fn owner_only_accepts_organization() {
        let err = Account::builder()
            .status(AccountStatus::Active)
            .owner(Reference::to("Patient", "p1").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidReferenceTarget {
                field: "owner".into(),
                actual: "Patient".into(),
                allowed: "Organization".into(),
            }
        );
    }

    #[test]
    fn metadata_mirrors_validated_allow_lists() {
        let info = Account::type_info();
        assert_eq!(
            info.element("subject").map(|e| e.reference_types),
            Some(SUBJECT_TARGETS)
        );
        assert!(info.element("status").is_some_and(|e| e.required));
    }
}
