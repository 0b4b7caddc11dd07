//! Resource bindings: root records and the fields every root record shares.

use std::any::Any;

use crate::domain::{
    accept_list, accept_opt, Buildable, Builder, Element, ListSlot, ValidationPolicy,
    ValidationResult, Visitable, Visitor,
};
use crate::types::{Code, Extension, Id, Uri};

pub mod account;
pub mod adverse_event;
pub mod codes;

pub use account::{Account, AccountBuilder, Guarantor, GuarantorBuilder};
pub use adverse_event::{
    AdverseEvent, AdverseEventBuilder, AdverseEventOccurrence, Participant, ParticipantBuilder,
};
pub use codes::{AccountStatus, AdverseEventActuality, AdverseEventStatus};

/// Root records this crate binds, in name order.
pub const RESOURCE_TYPE_NAMES: &[&str] = &["Account", "AdverseEvent"];

/// Fields of every root record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceCommon {
    pub(crate) id: Option<Id>,
    pub(crate) implicit_rules: Option<Uri>,
    pub(crate) language: Option<Code>,
}

impl ResourceCommon {
    pub fn has_content(&self) -> bool {
        self.id.is_some() || self.implicit_rules.is_some() || self.language.is_some()
    }
}

/// Fields of every domain resource on top of [`ResourceCommon`]:
/// contained records and both extension lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DomainResourceCommon {
    pub(crate) resource: ResourceCommon,
    pub(crate) contained: Vec<Resource>,
    pub(crate) extension: Vec<Extension>,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl DomainResourceCommon {
    /// Logical id as text.
    pub fn id(&self) -> Option<&str> {
        self.resource.id.as_ref().and_then(Id::as_str)
    }

    pub fn logical_id(&self) -> Option<&Id> {
        self.resource.id.as_ref()
    }

    pub fn implicit_rules(&self) -> Option<&Uri> {
        self.resource.implicit_rules.as_ref()
    }

    pub fn language(&self) -> Option<&Code> {
        self.resource.language.as_ref()
    }

    /// Embedded records owned by this one; they have no identity outside it.
    pub fn contained(&self) -> &[Resource] {
        &self.contained
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }

    pub fn has_content(&self) -> bool {
        self.resource.has_content()
            || !self.contained.is_empty()
            || !self.extension.is_empty()
            || !self.modifier_extension.is_empty()
    }

    /// Walk the shared fields in declaration order.
    pub fn accept_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        accept_opt(&self.resource.id, "id", visitor)?;
        accept_opt(&self.resource.implicit_rules, "implicitRules", visitor)?;
        accept_opt(&self.resource.language, "language", visitor)?;
        accept_list(&self.contained, "contained", "Resource", visitor)?;
        accept_list(&self.extension, "extension", "Extension", visitor)?;
        accept_list(
            &self.modifier_extension,
            "modifierExtension",
            "Extension",
            visitor,
        )
    }
}

/// Builder state shared by every root record.
#[derive(Debug, Clone, Default)]
pub struct DomainResourceBuilderCore {
    id: Option<Id>,
    implicit_rules: Option<Uri>,
    language: Option<Code>,
    contained: ListSlot<Resource>,
    extension: ListSlot<Extension>,
    modifier_extension: ListSlot<Extension>,
    policy: ValidationPolicy,
}

impl DomainResourceBuilderCore {
    pub fn from_common(common: &DomainResourceCommon) -> Self {
        Self {
            id: common.resource.id.clone(),
            implicit_rules: common.resource.implicit_rules.clone(),
            language: common.resource.language.clone(),
            contained: ListSlot::seeded(&common.contained),
            extension: ListSlot::seeded(&common.extension),
            modifier_extension: ListSlot::seeded(&common.modifier_extension),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ValidationPolicy {
        &mut self.policy
    }

    pub fn is_populated(&self) -> bool {
        self.id.is_some()
            || self.implicit_rules.is_some()
            || self.language.is_some()
            || !self.contained.is_empty()
            || !self.extension.is_empty()
            || !self.modifier_extension.is_empty()
    }

    pub fn freeze(self) -> ValidationResult<DomainResourceCommon> {
        let validating = self.policy.validating;
        Ok(DomainResourceCommon {
            resource: ResourceCommon {
                id: self.id,
                implicit_rules: self.implicit_rules,
                language: self.language,
            },
            contained: self.contained.freeze("contained", "Resource", validating)?,
            extension: self.extension.freeze("extension", "Extension", validating)?,
            modifier_extension: self.modifier_extension.freeze(
                "modifierExtension",
                "Extension",
                validating,
            )?,
        })
    }
}

/// Setters for the fields every root record declares.
pub trait DomainResourceBuilder: Builder {
    fn resource_core(&mut self) -> &mut DomainResourceBuilderCore;

    fn id(mut self, id: impl Into<Option<Id>>) -> Self {
        self.resource_core().id = id.into();
        self
    }

    fn implicit_rules(mut self, implicit_rules: impl Into<Option<Uri>>) -> Self {
        self.resource_core().implicit_rules = implicit_rules.into();
        self
    }

    fn language(mut self, language: impl Into<Option<Code>>) -> Self {
        self.resource_core().language = language.into();
        self
    }

    /// Append contained records.
    fn contained<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Resource>>,
    {
        self.resource_core().contained.append(items);
        self
    }

    fn set_contained<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Resource>>,
    {
        self.resource_core().contained.replace(items);
        self
    }

    fn extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.resource_core().extension.append(items);
        self
    }

    fn set_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.resource_core().extension.replace(items);
        self
    }

    fn modifier_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.resource_core().modifier_extension.append(items);
        self
    }

    fn set_modifier_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.resource_core().modifier_extension.replace(items);
        self
    }
}

/// Any root record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Account(Box<Account>),
    AdverseEvent(Box<AdverseEvent>),
}

impl Resource {
    pub fn resource_type(&self) -> &'static str {
        self.as_element().type_name()
    }

    pub fn as_element(&self) -> &dyn Element {
        match self {
            Resource::Account(account) => &**account,
            Resource::AdverseEvent(event) => &**event,
        }
    }

    fn common(&self) -> &DomainResourceCommon {
        match self {
            Resource::Account(account) => &account.common,
            Resource::AdverseEvent(event) => &event.common,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.common().id()
    }

    /// The concrete record, if it is a `T`.
    pub fn get<T: Element>(&self) -> Option<&T> {
        self.as_element().as_any().downcast_ref::<T>()
    }

    /// Rebuild the held record with a new policy, e.g. after decoding.
    pub fn rebuild(&self, policy: ValidationPolicy) -> ValidationResult<Resource> {
        Ok(match self {
            Resource::Account(account) => account.to_builder().policy(policy).build()?.into(),
            Resource::AdverseEvent(event) => event.to_builder().policy(policy).build()?.into(),
        })
    }
}

impl From<Account> for Resource {
    fn from(account: Account) -> Self {
        Resource::Account(Box::new(account))
    }
}

impl From<AdverseEvent> for Resource {
    fn from(event: AdverseEvent) -> Self {
        Resource::AdverseEvent(Box::new(event))
    }
}

impl Element for Resource {
    fn type_name(&self) -> &'static str {
        self.resource_type()
    }

    fn has_content(&self) -> bool {
        self.as_element().has_content()
    }

    fn stable_hash(&self) -> u64 {
        self.as_element().stable_hash()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Resource {
    /// Dispatch to the held record; the union itself is not a node.
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        match self {
            Resource::Account(account) => account.accept(name, index, visitor),
            Resource::AdverseEvent(event) => event.accept(name, index, visitor),
        }
    }
}
