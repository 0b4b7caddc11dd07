//! Reference: a weak, by-identifier link to another root record.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_opt, memo_hash, require_value_or_children, walk, Buildable, Builder, Constraint,
    ConstraintLevel, Element, ElementBuilder, ElementBuilderCore, ElementCommon, ElementInfo,
    HashMemo, ModelType, TypeCategory, TypeInfo, ValidationPolicy, ValidationResult, Visitable,
    Visitor,
};
use crate::macros::{impl_extensible, impl_node_hash};
use crate::types::{FhirString, Identifier, Uri};

/// Canonical prefix of core record-type urls; `type` may use either form.
pub const STRUCTURE_DEFINITION_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";

static ELEMENTS: [ElementInfo; 4] = [
    ElementInfo::scalar("reference", "string").summary(),
    ElementInfo::scalar("type", "uri").summary(),
    ElementInfo::scalar("identifier", "Identifier").summary(),
    ElementInfo::scalar("display", "string").summary(),
];

static CONSTRAINTS: [Constraint; 1] = [Constraint {
    id: "ref-1",
    level: ConstraintLevel::Rule,
    location: "(base)",
    description: "SHALL have a contained resource if a local reference is provided",
    expression: "reference.startsWith('#').not() or (reference.substring(1).trace('url') in %rootResource.contained.id.trace('ids'))",
    source: "http://hl7.org/fhir/StructureDefinition/Reference",
    generated: false,
}];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "Reference",
    category: TypeCategory::DataType,
    elements: &ELEMENTS,
    constraints: &CONSTRAINTS,
};

/// The target is never resolved or owned; it may be absent from memory and
/// storage alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    common: ElementCommon,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Identifier>,
    display: Option<FhirString>,
    memo: HashMemo,
}

impl Reference {
    /// Literal reference `"{type_name}/{id}"` declaring `type_name` as its target type.
    pub fn to(type_name: &str, id: &str) -> ValidationResult<Self> {
        Self::builder()
            .reference(FhirString::of(format!("{type_name}/{id}"))?)
            .type_(Uri::of(type_name)?)
            .build()
    }

    /// Literal reference without a declared target type.
    pub fn untyped(reference: &str) -> ValidationResult<Self> {
        Self::builder().reference(FhirString::of(reference)?).build()
    }

    pub fn reference(&self) -> Option<&FhirString> {
        self.reference.as_ref()
    }

    pub fn type_(&self) -> Option<&Uri> {
        self.type_.as_ref()
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    /// Declared target type name, with the canonical url prefix stripped.
    ///
    /// `None` when the reference carries no `type`.
    pub fn target_type_name(&self) -> Option<&str> {
        let uri = self.type_.as_ref()?.as_str()?;
        Some(uri.strip_prefix(STRUCTURE_DEFINITION_PREFIX).unwrap_or(uri))
    }
}

impl Element for Reference {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || self.reference.is_some()
            || self.type_.is_some()
            || self.identifier.is_some()
            || self.display.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                TYPE_INFO.name,
                &self.common,
                &self.reference,
                &self.type_,
                &self.identifier,
                &self.display,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Reference {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.reference, "reference", visitor)?;
            accept_opt(&self.type_, "type", visitor)?;
            accept_opt(&self.identifier, "identifier", visitor)?;
            accept_opt(&self.display, "display", visitor)
        })
    }
}

impl ModelType for Reference {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(Reference);
impl_extensible!(Reference);

impl Buildable for Reference {
    type Builder = ReferenceBuilder;

    fn builder() -> ReferenceBuilder {
        ReferenceBuilder::default()
    }

    fn to_builder(&self) -> ReferenceBuilder {
        ReferenceBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    core: ElementBuilderCore,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Identifier>,
    display: Option<FhirString>,
}

impl ReferenceBuilder {
    pub fn reference(mut self, reference: impl Into<Option<FhirString>>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn type_(mut self, type_: impl Into<Option<Uri>>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn identifier(mut self, identifier: impl Into<Option<Identifier>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn display(mut self, display: impl Into<Option<FhirString>>) -> Self {
        self.display = display.into();
        self
    }
}

impl From<&Reference> for ReferenceBuilder {
    fn from(reference: &Reference) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&reference.common),
            reference: reference.reference.clone(),
            type_: reference.type_.clone(),
            identifier: reference.identifier.clone(),
            display: reference.display.clone(),
        }
    }
}

impl ElementBuilder for ReferenceBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for ReferenceBuilder {
    type Output = Reference;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated()
            || self.reference.is_some()
            || self.type_.is_some()
            || self.identifier.is_some()
            || self.display.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Reference> {
        let validating = self.core.policy().validating;
        let built = Reference {
            common: self.core.freeze()?,
            reference: self.reference,
            type_: self.type_,
            identifier: self.identifier,
            display: self.display,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = TYPE_INFO.name, "built");
        Ok(built)
    }
}
