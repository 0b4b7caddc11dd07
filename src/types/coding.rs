//! Terminology references: `Coding` and `CodeableConcept`.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_list, accept_opt, memo_hash, require_value_or_children, walk, Buildable, Builder,
    Element, ElementBuilder, ElementBuilderCore, ElementCommon, ElementInfo, HashMemo, ListSlot,
    ModelType, TypeCategory, TypeInfo, ValidationPolicy, ValidationResult, Visitable, Visitor,
};
use crate::macros::{impl_extensible, impl_node_hash};
use crate::types::{Code, FhirBoolean, FhirString, Uri};

static CODING_ELEMENTS: [ElementInfo; 5] = [
    ElementInfo::scalar("system", "uri").summary(),
    ElementInfo::scalar("version", "string").summary(),
    ElementInfo::scalar("code", "code").summary(),
    ElementInfo::scalar("display", "string").summary(),
    ElementInfo::scalar("userSelected", "boolean").summary(),
];

static CODING_INFO: TypeInfo = TypeInfo {
    name: "Coding",
    category: TypeCategory::DataType,
    elements: &CODING_ELEMENTS,
    constraints: &[],
};

/// A code defined by a terminology system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coding {
    common: ElementCommon,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<FhirBoolean>,
    memo: HashMemo,
}

impl Coding {
    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn version(&self) -> Option<&FhirString> {
        self.version.as_ref()
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    pub fn user_selected(&self) -> Option<&FhirBoolean> {
        self.user_selected.as_ref()
    }

    /// True when system and code both equal the given values.
    pub fn is(&self, system: &str, code: &str) -> bool {
        self.system.as_ref().and_then(Uri::as_str) == Some(system)
            && self.code.as_ref().and_then(Code::as_str) == Some(code)
    }
}

impl Element for Coding {
    fn type_name(&self) -> &'static str {
        CODING_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content()
            || self.system.is_some()
            || self.version.is_some()
            || self.code.is_some()
            || self.display.is_some()
            || self.user_selected.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(
                CODING_INFO.name,
                &self.common,
                &self.system,
                &self.version,
                &self.code,
                &self.display,
                &self.user_selected,
            ))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Coding {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.system, "system", visitor)?;
            accept_opt(&self.version, "version", visitor)?;
            accept_opt(&self.code, "code", visitor)?;
            accept_opt(&self.display, "display", visitor)?;
            accept_opt(&self.user_selected, "userSelected", visitor)
        })
    }
}

impl ModelType for Coding {
    fn type_info() -> &'static TypeInfo {
        &CODING_INFO
    }
}

impl_node_hash!(Coding, CodeableConcept);
impl_extensible!(Coding, CodeableConcept);

impl Buildable for Coding {
    type Builder = CodingBuilder;

    fn builder() -> CodingBuilder {
        CodingBuilder::default()
    }

    fn to_builder(&self) -> CodingBuilder {
        CodingBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodingBuilder {
    core: ElementBuilderCore,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<FhirBoolean>,
}

impl CodingBuilder {
    pub fn system(mut self, system: impl Into<Option<Uri>>) -> Self {
        self.system = system.into();
        self
    }

    pub fn version(mut self, version: impl Into<Option<FhirString>>) -> Self {
        self.version = version.into();
        self
    }

    pub fn code(mut self, code: impl Into<Option<Code>>) -> Self {
        self.code = code.into();
        self
    }

    pub fn display(mut self, display: impl Into<Option<FhirString>>) -> Self {
        self.display = display.into();
        self
    }

    pub fn user_selected(mut self, user_selected: impl Into<Option<FhirBoolean>>) -> Self {
        self.user_selected = user_selected.into();
        self
    }
}

impl From<&Coding> for CodingBuilder {
    fn from(coding: &Coding) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&coding.common),
            system: coding.system.clone(),
            version: coding.version.clone(),
            code: coding.code.clone(),
            display: coding.display.clone(),
            user_selected: coding.user_selected.clone(),
        }
    }
}

impl ElementBuilder for CodingBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for CodingBuilder {
    type Output = Coding;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated()
            || self.system.is_some()
            || self.version.is_some()
            || self.code.is_some()
            || self.display.is_some()
            || self.user_selected.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Coding> {
        let validating = self.core.policy().validating;
        let built = Coding {
            common: self.core.freeze()?,
            system: self.system,
            version: self.version,
            code: self.code,
            display: self.display,
            user_selected: self.user_selected,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = CODING_INFO.name, "built");
        Ok(built)
    }
}

static CONCEPT_ELEMENTS: [ElementInfo; 2] = [
    ElementInfo::list("coding", "Coding").summary(),
    ElementInfo::scalar("text", "string").summary(),
];

static CONCEPT_INFO: TypeInfo = TypeInfo {
    name: "CodeableConcept",
    category: TypeCategory::DataType,
    elements: &CONCEPT_ELEMENTS,
    constraints: &[],
};

/// A concept given by codings from one or more systems and/or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeableConcept {
    common: ElementCommon,
    coding: Vec<Coding>,
    text: Option<FhirString>,
    memo: HashMemo,
}

impl CodeableConcept {
    pub fn coding(&self) -> &[Coding] {
        &self.coding
    }

    pub fn text(&self) -> Option<&FhirString> {
        self.text.as_ref()
    }

    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding.iter().any(|c| c.is(system, code))
    }
}

impl Element for CodeableConcept {
    fn type_name(&self) -> &'static str {
        CONCEPT_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content() || !self.coding.is_empty() || self.text.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo.get_or_compute(|| {
            memo_hash(&(CONCEPT_INFO.name, &self.common, &self.coding, &self.text))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for CodeableConcept {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_list(&self.coding, "coding", "Coding", visitor)?;
            accept_opt(&self.text, "text", visitor)
        })
    }
}

impl ModelType for CodeableConcept {
    fn type_info() -> &'static TypeInfo {
        &CONCEPT_INFO
    }
}

impl Buildable for CodeableConcept {
    type Builder = CodeableConceptBuilder;

    fn builder() -> CodeableConceptBuilder {
        CodeableConceptBuilder::default()
    }

    fn to_builder(&self) -> CodeableConceptBuilder {
        CodeableConceptBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeableConceptBuilder {
    core: ElementBuilderCore,
    coding: ListSlot<Coding>,
    text: Option<FhirString>,
}

impl CodeableConceptBuilder {
    /// Append codings.
    pub fn coding<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Coding>>,
    {
        self.coding.append(items);
        self
    }

    /// Replace the codings.
    pub fn set_coding<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Coding>>,
    {
        self.coding.replace(items);
        self
    }

    pub fn text(mut self, text: impl Into<Option<FhirString>>) -> Self {
        self.text = text.into();
        self
    }
}

impl From<&CodeableConcept> for CodeableConceptBuilder {
    fn from(concept: &CodeableConcept) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&concept.common),
            coding: ListSlot::seeded(&concept.coding),
            text: concept.text.clone(),
        }
    }
}

impl ElementBuilder for CodeableConceptBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for CodeableConceptBuilder {
    type Output = CodeableConcept;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated() || !self.coding.is_empty() || self.text.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<CodeableConcept> {
        let validating = self.core.policy().validating;
        let built = CodeableConcept {
            coding: self.coding.freeze("coding", "Coding", validating)?,
            common: self.core.freeze()?,
            text: self.text,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = CONCEPT_INFO.name, "built");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    fn coding(code: &str) -> Coding {
        Coding::builder()
            .system(Uri::of("http://snomed.info/sct").unwrap())
            .code(Code::of(code).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn concept_matches_system_and_code() {
        let concept = CodeableConcept::builder()
            .coding([coding("1"), coding("2")])
            .build()
            .unwrap();
        assert!(concept.has_coding("http://snomed.info/sct", "2"));
        assert!(!concept.has_coding("http://loinc.org", "2"));
    }

    #[test]
    fn absent_coding_member_is_rejected() {
        let err = CodeableConcept::builder()
            .coding([Some(coding("1")), None])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NullListElement {
                field: "coding".into(),
                element_kind: "Coding".into()
            }
        );
    }

    #[test]
    fn set_coding_replaces_appended_members() {
        let concept = CodeableConcept::builder()
            .coding([coding("1")])
            .set_coding([coding("9")])
            .build()
            .unwrap();
        assert_eq!(concept.coding().len(), 1);
        assert!(concept.has_coding("http://snomed.info/sct", "9"));
    }
}
