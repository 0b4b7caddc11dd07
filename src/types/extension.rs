//! Extension: additional content attached to any element, identified by url.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_attribute, accept_choice, memo_hash, require_non_null, require_value_or_children, walk,
    Buildable, Builder, Constraint, ConstraintLevel, DataKind, Element, ElementBuilder,
    ElementBuilderCore, ElementCommon, ElementInfo, HashMemo, ModelType, TypeCategory, TypeInfo,
    ValidationPolicy, ValidationResult, Visitable, Visitor,
};
use crate::macros::{impl_extensible, impl_node_hash};
use crate::types::DataValue;

static ELEMENTS: [ElementInfo; 2] = [
    ElementInfo::scalar("url", "uri").required(),
    ElementInfo::choice("value", DataKind::ALL),
];

static CONSTRAINTS: [Constraint; 1] = [Constraint {
    id: "ext-1",
    level: ConstraintLevel::Rule,
    location: "(base)",
    description: "Must have either extensions or value[x], not both",
    expression: "extension.exists() != value.exists()",
    source: "http://hl7.org/fhir/StructureDefinition/Extension",
    generated: false,
}];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "Extension",
    category: TypeCategory::DataType,
    elements: &ELEMENTS,
    constraints: &CONSTRAINTS,
};

/// Either a value or nested extensions; `url` names the definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    common: ElementCommon,
    url: Option<String>,
    value: Option<DataValue>,
    memo: HashMemo,
}

impl Extension {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn value(&self) -> Option<&DataValue> {
        self.value.as_ref()
    }
}

impl Element for Extension {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    /// `url` is an attribute and does not count.
    fn has_content(&self) -> bool {
        self.common.has_content() || self.value.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo
            .get_or_compute(|| memo_hash(&(TYPE_INFO.name, &self.common, &self.url, &self.value)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Extension {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_attribute(&self.url, "url", visitor)?;
            accept_choice(&self.value, "value", visitor)
        })
    }
}

impl ModelType for Extension {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(Extension);
impl_extensible!(Extension);

impl Buildable for Extension {
    type Builder = ExtensionBuilder;

    fn builder() -> ExtensionBuilder {
        ExtensionBuilder::default()
    }

    fn to_builder(&self) -> ExtensionBuilder {
        ExtensionBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionBuilder {
    core: ElementBuilderCore,
    url: Option<String>,
    value: Option<DataValue>,
}

impl ExtensionBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Any datatype value.
    pub fn value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn clear_value(mut self) -> Self {
        self.value = None;
        self
    }
}

impl From<&Extension> for ExtensionBuilder {
    fn from(extension: &Extension) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&extension.common),
            url: extension.url.clone(),
            value: extension.value.clone(),
        }
    }
}

impl ElementBuilder for ExtensionBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for ExtensionBuilder {
    type Output = Extension;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated() || self.url.is_some() || self.value.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Extension> {
        let validating = self.core.policy().validating;
        if validating {
            require_non_null(&self.url, "url")?;
        }
        let built = Extension {
            common: self.core.freeze()?,
            url: self.url,
            value: self.value,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = TYPE_INFO.name, url = ?built.url(), "built");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Extensible, ValidationError};
    use crate::types::{Code, FhirString};

    #[test]
    fn url_is_required() {
        let err = Extension::builder()
            .value(FhirString::of("x").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField { field: "url".into() }
        );
    }

    #[test]
    fn url_alone_is_empty() {
        let err = Extension::builder().url("urn:test").build().unwrap_err();
        assert_eq!(err.rule(), "value-or-children");
    }

    #[test]
    fn nested_extensions_count_as_content() {
        let inner = Extension::builder()
            .url("detail")
            .value(Code::of("x").unwrap())
            .build()
            .unwrap();
        let outer = Extension::builder()
            .url("urn:test:complex")
            .extension([inner])
            .build()
            .unwrap();
        assert_eq!(outer.extensions_by_url("detail").count(), 1);
        assert!(outer.value().is_none());
    }
}
