//! AdverseEvent: an actual or potential unintended effect on a patient or research subject.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_choice, accept_list, accept_opt, check_reference_target, check_reference_targets,
    memo_hash, require_non_null, require_value_or_children, resolve_choice, walk,
    BackboneBuilder, BackboneBuilderCore, BackboneCommon, Buildable, Builder, Choice, DataKind,
    Element, ElementBuilder, ElementBuilderCore, ElementInfo, HashMemo, ListSlot, ModelType,
    TypeCategory, TypeInfo, ValidationPolicy, ValidationResult, Visitable, Visitor,
};
use crate::macros::{impl_modifier_extensible, impl_node_hash};
use crate::resource::codes::{AdverseEventActuality, AdverseEventStatus};
use crate::resource::{DomainResourceBuilder, DomainResourceBuilderCore, DomainResourceCommon};
use crate::types::{
    CodeableConcept, DataValue, Enumerated, FhirDateTime, Identifier, Period, Reference,
};

const SUBJECT_TARGETS: &[&str] = &[
    "Patient",
    "Group",
    "Practitioner",
    "RelatedPerson",
    "ResearchSubject",
];
const ENCOUNTER_TARGETS: &[&str] = &["Encounter"];
const RESULTING_EFFECT_TARGETS: &[&str] = &["Condition", "Observation"];
const LOCATION_TARGETS: &[&str] = &["Location"];
const ACTOR_TARGETS: &[&str] = &[
    "Practitioner",
    "PractitionerRole",
    "Organization",
    "CareTeam",
    "Patient",
    "Device",
    "RelatedPerson",
    "ResearchSubject",
];

/// Element metadata in declaration order.
///
/// `occurrence[x]` lists only dateTime and Period: the schema's Timing
/// alternative is not modelled, so events carrying a Timing cannot be built.
static ELEMENTS: [ElementInfo; 13] = [
    ElementInfo::list("identifier", "Identifier").summary(),
    ElementInfo::scalar("status", "code").required().summary(),
    ElementInfo::scalar("actuality", "code").required().summary(),
    ElementInfo::list("category", "CodeableConcept").summary(),
    ElementInfo::scalar("code", "CodeableConcept").summary(),
    ElementInfo::scalar("subject", "Reference")
        .required()
        .summary()
        .references(SUBJECT_TARGETS),
    ElementInfo::scalar("encounter", "Reference")
        .summary()
        .references(ENCOUNTER_TARGETS),
    ElementInfo::choice("occurrence", AdverseEventOccurrence::ALTERNATIVES).summary(),
    ElementInfo::scalar("detected", "dateTime").summary(),
    ElementInfo::scalar("recordedDate", "dateTime").summary(),
    ElementInfo::list("resultingEffect", "Reference")
        .summary()
        .references(RESULTING_EFFECT_TARGETS),
    ElementInfo::scalar("location", "Reference")
        .summary()
        .references(LOCATION_TARGETS),
    ElementInfo::list("participant", "AdverseEvent.Participant").summary(),
];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "AdverseEvent",
    category: TypeCategory::Resource,
    elements: &ELEMENTS,
    constraints: &[],
};

/// When the event occurred: a point in time or an interval.
///
/// Narrower than the schema's `occurrence[x]`, which also allows Timing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdverseEventOccurrence {
    DateTime(FhirDateTime),
    Period(Period),
}

impl Choice for AdverseEventOccurrence {
    const ALTERNATIVES: &'static [DataKind] = &[DataKind::DateTime, DataKind::Period];

    fn kind(&self) -> DataKind {
        match self {
            AdverseEventOccurrence::DateTime(_) => DataKind::DateTime,
            AdverseEventOccurrence::Period(_) => DataKind::Period,
        }
    }

    fn into_value(self) -> DataValue {
        match self {
            AdverseEventOccurrence::DateTime(value) => value.into(),
            AdverseEventOccurrence::Period(value) => value.into(),
        }
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::DateTime(value) => Some(AdverseEventOccurrence::DateTime(value)),
            DataValue::Period(value) => Some(AdverseEventOccurrence::Period(value)),
            _ => None,
        }
    }

    fn accept_alternative<V: Visitor + ?Sized>(
        &self,
        name: &str,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        match self {
            AdverseEventOccurrence::DateTime(value) => value.accept(name, None, visitor),
            AdverseEventOccurrence::Period(value) => value.accept(name, None, visitor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdverseEvent {
    pub(crate) common: DomainResourceCommon,
    identifier: Vec<Identifier>,
    status: Option<Enumerated<AdverseEventStatus>>,
    actuality: Option<Enumerated<AdverseEventActuality>>,
    category: Vec<CodeableConcept>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    occurrence: Option<AdverseEventOccurrence>,
    detected: Option<FhirDateTime>,
    recorded_date: Option<FhirDateTime>,
    resulting_effect: Vec<Reference>,
    location: Option<Reference>,
    participant: Vec<Participant>,
    memo: HashMemo,
}

impl AdverseEvent {
    pub fn common(&self) -> &DomainResourceCommon {
        &self.common
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn status(&self) -> Option<&Enumerated<AdverseEventStatus>> {
        self.status.as_ref()
    }

    pub fn actuality(&self) -> Option<&Enumerated<AdverseEventActuality>> {
        self.actuality.as_ref()
    }

    pub fn category(&self) -> &[CodeableConcept] {
        &self.category
    }

    pub fn code(&self) -> Option<&CodeableConcept> {
        self.code.as_ref()
    }

    pub fn subject(&self) -> Option<&Reference> {
        self.subject.as_ref()
    }

    pub fn encounter(&self) -> Option<&Reference> {
        self.encounter.as_ref()
    }

    pub fn occurrence(&self) -> Option<&AdverseEventOccurrence> {
        self.occurrence.as_ref()
    }

    pub fn detected(&self) -> Option<&FhirDateTime> {
        self.detected.as_ref()
    }

    pub fn recorded_date(&self) -> Option<&FhirDateTime> {
        self.recorded_date.as_ref()
    }

    pub fn resulting_effect(&self) -> &[Reference] {
        &self.resulting_effect
    }

    pub fn location(&self) -> Option<&Reference> {
        self.location.as_ref()
    }

    pub fn participant(&self) -> &[Participant] {
        &self.participant
    }
}

impl Element for AdverseEvent {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || !self.identifier.is_empty()
            || self.status.is_some()
            || self.actuality.is_some()
            || !self.category.is_empty()
            || self.code.is_some()
            || self.subject.is_some()
            || self.encounter.is_some()
            || self.occurrence.is_some()
            || self.detected.is_some()
            || self.recorded_date.is_some()
            || !self.resulting_effect.is_empty()
            || self.location.is_some()
            || !self.participant.is_empty()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                TYPE_INFO.name,
                &self.common,
                (
                    &self.identifier,
                    &self.status,
                    &self.actuality,
                    &self.category,
                    &self.code,
                    &self.subject,
                    &self.encounter,
                ),
                (
                    &self.occurrence,
                    &self.detected,
                    &self.recorded_date,
                    &self.resulting_effect,
                    &self.location,
                    &self.participant,
                ),
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for AdverseEvent {
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
            accept_opt(&self.actuality, "actuality", visitor)?;
            accept_list(&self.category, "category", "CodeableConcept", visitor)?;
            accept_opt(&self.code, "code", visitor)?;
            accept_opt(&self.subject, "subject", visitor)?;
            accept_opt(&self.encounter, "encounter", visitor)?;
            accept_choice(&self.occurrence, "occurrence", visitor)?;
            accept_opt(&self.detected, "detected", visitor)?;
            accept_opt(&self.recorded_date, "recordedDate", visitor)?;
            accept_list(&self.resulting_effect, "resultingEffect", "Reference", visitor)?;
            accept_opt(&self.location, "location", visitor)?;
            accept_list(&self.participant, "participant", "Participant", visitor)
        })
    }
}

impl ModelType for AdverseEvent {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(AdverseEvent, Participant);
impl_modifier_extensible!(AdverseEvent, Participant);

impl Buildable for AdverseEvent {
    type Builder = AdverseEventBuilder;

    fn builder() -> AdverseEventBuilder {
        AdverseEventBuilder::default()
    }

    fn to_builder(&self) -> AdverseEventBuilder {
        AdverseEventBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdverseEventBuilder {
    common: DomainResourceBuilderCore,
    identifier: ListSlot<Identifier>,
    status: Option<Enumerated<AdverseEventStatus>>,
    actuality: Option<Enumerated<AdverseEventActuality>>,
    category: ListSlot<CodeableConcept>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    occurrence: Option<DataValue>,
    detected: Option<FhirDateTime>,
    recorded_date: Option<FhirDateTime>,
    resulting_effect: ListSlot<Reference>,
    location: Option<Reference>,
    participant: ListSlot<Participant>,
}

impl AdverseEventBuilder {
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

    pub fn status(mut self, status: impl Into<Option<AdverseEventStatus>>) -> Self {
        let status: Option<AdverseEventStatus> = status.into();
        self.status = status.map(Enumerated::from);
        self
    }

    pub fn status_element(
        mut self,
        status: impl Into<Option<Enumerated<AdverseEventStatus>>>,
    ) -> Self {
        self.status = status.into();
        self
    }

    pub fn actuality(mut self, actuality: impl Into<Option<AdverseEventActuality>>) -> Self {
        let actuality: Option<AdverseEventActuality> = actuality.into();
        self.actuality = actuality.map(Enumerated::from);
        self
    }

    pub fn actuality_element(
        mut self,
        actuality: impl Into<Option<Enumerated<AdverseEventActuality>>>,
    ) -> Self {
        self.actuality = actuality.into();
        self
    }

    pub fn category<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<CodeableConcept>>,
    {
        self.category.append(items);
        self
    }

    pub fn set_category<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<CodeableConcept>>,
    {
        self.category.replace(items);
        self
    }

    pub fn code(mut self, code: impl Into<Option<CodeableConcept>>) -> Self {
        self.code = code.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<Option<Reference>>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn encounter(mut self, encounter: impl Into<Option<Reference>>) -> Self {
        self.encounter = encounter.into();
        self
    }

    /// Any datatype value; anything but a dateTime or Period fails a validating build.
    pub fn occurrence(mut self, occurrence: impl Into<DataValue>) -> Self {
        self.occurrence = Some(occurrence.into());
        self
    }

    pub fn clear_occurrence(mut self) -> Self {
        self.occurrence = None;
        self
    }

    pub fn detected(mut self, detected: impl Into<Option<FhirDateTime>>) -> Self {
        self.detected = detected.into();
        self
    }

    pub fn recorded_date(mut self, recorded_date: impl Into<Option<FhirDateTime>>) -> Self {
        self.recorded_date = recorded_date.into();
        self
    }

    pub fn resulting_effect<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Reference>>,
    {
        self.resulting_effect.append(items);
        self
    }

    pub fn set_resulting_effect<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Reference>>,
    {
        self.resulting_effect.replace(items);
        self
    }

    pub fn location(mut self, location: impl Into<Option<Reference>>) -> Self {
        self.location = location.into();
        self
    }

    pub fn participant<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Participant>>,
    {
        self.participant.append(items);
        self
    }

    pub fn set_participant<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Participant>>,
    {
        self.participant.replace(items);
        self
    }
}

impl From<&AdverseEvent> for AdverseEventBuilder {
    fn from(event: &AdverseEvent) -> Self {
        Self {
            common: DomainResourceBuilderCore::from_common(&event.common),
            identifier: ListSlot::seeded(&event.identifier),
            status: event.status.clone(),
            actuality: event.actuality.clone(),
            category: ListSlot::seeded(&event.category),
            code: event.code.clone(),
            subject: event.subject.clone(),
            encounter: event.encounter.clone(),
            occurrence: event.occurrence.clone().map(Choice::into_value),
            detected: event.detected.clone(),
            recorded_date: event.recorded_date.clone(),
            resulting_effect: ListSlot::seeded(&event.resulting_effect),
            location: event.location.clone(),
            participant: ListSlot::seeded(&event.participant),
        }
    }
}

impl DomainResourceBuilder for AdverseEventBuilder {
    fn resource_core(&mut self) -> &mut DomainResourceBuilderCore {
        &mut self.common
    }
}

impl Builder for AdverseEventBuilder {
    type Output = AdverseEvent;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.common.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.common.is_populated()
            || !self.identifier.is_empty()
            || self.status.is_some()
            || self.actuality.is_some()
            || !self.category.is_empty()
            || self.code.is_some()
            || self.subject.is_some()
            || self.encounter.is_some()
            || self.occurrence.is_some()
            || self.detected.is_some()
            || self.recorded_date.is_some()
            || !self.resulting_effect.is_empty()
            || self.location.is_some()
            || !self.participant.is_empty()
    }

    #[instrument(level = "debug", skip(self))]
    fn build(self) -> ValidationResult<AdverseEvent> {
        let policy = self.common.policy();
        let validating = policy.validating;
        let common = self.common.freeze()?;
        let identifier = self
            .identifier
            .freeze("identifier", "Identifier", validating)?;
        let category = self
            .category
            .freeze("category", "CodeableConcept", validating)?;
        let resulting_effect = self
            .resulting_effect
            .freeze("resultingEffect", "Reference", validating)?;
        let participant = self
            .participant
            .freeze("participant", "Participant", validating)?;
        if validating {
            require_non_null(&self.status, "status")?;
            require_non_null(&self.actuality, "actuality")?;
            require_non_null(&self.subject, "subject")?;
            check_reference_target(self.subject.as_ref(), "subject", SUBJECT_TARGETS, policy)?;
            check_reference_target(
                self.encounter.as_ref(),
                "encounter",
                ENCOUNTER_TARGETS,
                policy,
            )?;
            check_reference_targets(
                &resulting_effect,
                "resultingEffect",
                RESULTING_EFFECT_TARGETS,
                policy,
            )?;
            check_reference_target(self.location.as_ref(), "location", LOCATION_TARGETS, policy)?;
        }
        let occurrence =
            resolve_choice::<AdverseEventOccurrence>(self.occurrence, "occurrence", policy)?;
        let built = AdverseEvent {
            common,
            identifier,
            status: self.status,
            actuality: self.actuality,
            category,
            code: self.code,
            subject: self.subject,
            encounter: self.encounter,
            occurrence,
            detected: self.detected,
            recorded_date: self.recorded_date,
            resulting_effect,
            location: self.location,
            participant,
            memo: HashMemo::new(),
        };
        debug!(type_name = TYPE_INFO.name, id = ?built.common.id(), "built");
        Ok(built)
    }
}

static PARTICIPANT_ELEMENTS: [ElementInfo; 2] = [
    ElementInfo::scalar("function", "CodeableConcept").summary(),
    ElementInfo::scalar("actor", "Reference")
        .required()
        .summary()
        .references(ACTOR_TARGETS),
];

static PARTICIPANT_INFO: TypeInfo = TypeInfo {
    name: "AdverseEvent.Participant",
    category: TypeCategory::Backbone,
    elements: &PARTICIPANT_ELEMENTS,
    constraints: &[],
};

/// Who was involved in the event and in what capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    common: BackboneCommon,
    function: Option<CodeableConcept>,
    actor: Option<Reference>,
    memo: HashMemo,
}

impl Participant {
    pub fn function(&self) -> Option<&CodeableConcept> {
        self.function.as_ref()
    }

    pub fn actor(&self) -> Option<&Reference> {
        self.actor.as_ref()
    }
}

impl Element for Participant {
    fn type_name(&self) -> &'static str {
        PARTICIPANT_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content() || self.function.is_some() || self.actor.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                PARTICIPANT_INFO.name,
                &self.common,
                &self.function,
                &self.actor,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Participant {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.function, "function", visitor)?;
            accept_opt(&self.actor, "actor", visitor)
        })
    }
}

impl ModelType for Participant {
    fn type_info() -> &'static TypeInfo {
        &PARTICIPANT_INFO
    }
}

impl Buildable for Participant {
    type Builder = ParticipantBuilder;

    fn builder() -> ParticipantBuilder {
        ParticipantBuilder::default()
    }

    fn to_builder(&self) -> ParticipantBuilder {
        ParticipantBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantBuilder {
    core: BackboneBuilderCore,
    function: Option<CodeableConcept>,
    actor: Option<Reference>,
}

impl ParticipantBuilder {
    pub fn function(mut self, function: impl Into<Option<CodeableConcept>>) -> Self {
        self.function = function.into();
        self
    }

    pub fn actor(mut self, actor: impl Into<Option<Reference>>) -> Self {
        self.actor = actor.into();
        self
    }
}

impl From<&Participant> for ParticipantBuilder {
    fn from(participant: &Participant) -> Self {
        Self {
            core: BackboneBuilderCore::from_common(&participant.common),
            function: participant.function.clone(),
            actor: participant.actor.clone(),
        }
    }
}

impl ElementBuilder for ParticipantBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        self.core.element_mut()
    }
}

impl BackboneBuilder for ParticipantBuilder {
    fn backbone_core(&mut self) -> &mut BackboneBuilderCore {
        &mut self.core
    }
}

impl Builder for ParticipantBuilder {
    type Output = Participant;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.element_mut().policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated() || self.function.is_some() || self.actor.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Participant> {
        let policy = self.core.policy();
        if policy.validating {
            require_non_null(&self.actor, "actor")?;
            check_reference_target(self.actor.as_ref(), "actor", ACTOR_TARGETS, policy)?;
        }
        let built = Participant {
            common: self.core.freeze()?,
            function: self.function,
            actor: self.actor,
            memo: HashMemo::new(),
        };
        if policy.validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = PARTICIPANT_INFO.name, "built");
        Ok(built)
    }
}
