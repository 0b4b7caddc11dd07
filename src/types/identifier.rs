//! Identifier: a business identifier issued within a namespace.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_opt, memo_hash, require_value_or_children, walk, Buildable, Builder, Element,
    ElementBuilder, ElementBuilderCore, ElementCommon, ElementInfo, HashMemo, ModelType,
    TypeCategory, TypeInfo, ValidationPolicy, ValidationResult, Visitable, Visitor,
};
use crate::macros::{impl_extensible, impl_node_hash};
use crate::types::{CodeableConcept, FhirString, Period, Uri};

static ELEMENTS: [ElementInfo; 4] = [
    ElementInfo::scalar("type", "CodeableConcept").summary(),
    ElementInfo::scalar("system", "uri").summary(),
    ElementInfo::scalar("value", "string").summary(),
    ElementInfo::scalar("period", "Period").summary(),
];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "Identifier",
    category: TypeCategory::DataType,
    elements: &ELEMENTS,
    constraints: &[],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    common: ElementCommon,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
    memo: HashMemo,
}

impl Identifier {
    /// Identifier `value` within namespace `system`.
    pub fn of(system: &str, value: &str) -> ValidationResult<Self> {
        Self::builder()
            .system(Uri::of(system)?)
            .value(FhirString::of(value)?)
            .build()
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn value(&self) -> Option<&FhirString> {
        self.value.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }
}

impl Element for Identifier {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || self.type_.is_some()
            || self.system.is_some()
            || self.value.is_some()
            || self.period.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                TYPE_INFO.name,
                &self.common,
                &self.type_,
                &self.system,
                &self.value,
                &self.period,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Identifier {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.type_, "type", visitor)?;
            accept_opt(&self.system, "system", visitor)?;
            accept_opt(&self.value, "value", visitor)?;
            accept_opt(&self.period, "period", visitor)
        })
    }
}

impl ModelType for Identifier {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(Identifier);
impl_extensible!(Identifier);

impl Buildable for Identifier {
    type Builder = IdentifierBuilder;

    fn builder() -> IdentifierBuilder {
        IdentifierBuilder::default()
    }

    fn to_builder(&self) -> IdentifierBuilder {
        IdentifierBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    core: ElementBuilderCore,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
}

impl IdentifierBuilder {
    pub fn type_(mut self, type_: impl Into<Option<CodeableConcept>>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn system(mut self, system: impl Into<Option<Uri>>) -> Self {
        self.system = system.into();
        self
    }

    pub fn value(mut self, value: impl Into<Option<FhirString>>) -> Self {
        self.value = value.into();
        self
    }

    pub fn period(mut self, period: impl Into<Option<Period>>) -> Self {
        self.period = period.into();
        self
    }
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(identifier: &Identifier) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&identifier.common),
            type_: identifier.type_.clone(),
            system: identifier.system.clone(),
            value: identifier.value.clone(),
            period: identifier.period.clone(),
        }
    }
}

impl ElementBuilder for IdentifierBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for IdentifierBuilder {
    type Output = Identifier;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated()
            || self.type_.is_some()
            || self.system.is_some()
            || self.value.is_some()
            || self.period.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Identifier> {
        let validating = self.core.policy().validating;
        let built = Identifier {
            common: self.core.freeze()?,
            type_: self.type_,
            system: self.system,
            value: self.value,
            period: self.period,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = TYPE_INFO.name, "built");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_of_sets_system_and_value() {
        let id = Identifier::of("urn:oid:1.2.3", "A-17").unwrap();
        assert_eq!(id.system().and_then(Uri::as_str), Some("urn:oid:1.2.3"));
        assert_eq!(id.value().and_then(FhirString::as_str), Some("A-17"));
    }

    #[test]
    fn identifier_of_rejects_blank_value() {
        assert!(Identifier::of("urn:oid:1.2.3", " ").is_err());
    }
}
