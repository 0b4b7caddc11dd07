//! Builder protocol: mutable accumulators that freeze into immutable records.
//!
//! A builder moves through Empty → Populated → Built. `build()` consumes the
//! builder, so no setter can run after the record exists. The only way to
//! "modify" a record is `to_builder()`, selective overrides, and a new build.

use serde::{Deserialize, Serialize};

use crate::domain::cardinality::ListSlot;
use crate::domain::element::{BackboneCommon, ElementCommon};
use crate::domain::error::ValidationResult;
use crate::types::Extension;

/// Switches controlling the validators run by `build()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Run declared validators at build time (default `true`).
    ///
    /// Turning this off is an escape hatch for trusted construction, e.g. a
    /// decoder whose input was validated upstream. Records built this way may
    /// violate the model's invariants.
    pub validating: bool,
    /// Accept references without a declared target type on allow-listed
    /// elements (default `true`).
    pub lenient_untyped_references: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            validating: true,
            lenient_untyped_references: true,
        }
    }
}

impl ValidationPolicy {
    /// Policy for trusted internal construction: no validators run.
    pub fn trusted() -> Self {
        Self {
            validating: false,
            ..Self::default()
        }
    }

    /// Validating policy that also rejects untyped references on allow-listed elements.
    pub fn strict() -> Self {
        Self {
            validating: true,
            lenient_untyped_references: false,
        }
    }
}

/// Mutable accumulator producing one immutable `Output`.
pub trait Builder: Sized {
    type Output;

    fn policy_mut(&mut self) -> &mut ValidationPolicy;

    fn policy(mut self, policy: ValidationPolicy) -> Self {
        *self.policy_mut() = policy;
        self
    }

    /// Enable or disable build-time validation (default enabled).
    fn validating(mut self, validating: bool) -> Self {
        self.policy_mut().validating = validating;
        self
    }

    /// `false` while the builder is still Empty.
    fn is_populated(&self) -> bool;

    /// Freeze the accumulated state and run the declared validators.
    fn build(self) -> ValidationResult<Self::Output>;
}

/// Immutable records constructible through a [`Builder`].
pub trait Buildable: Sized {
    type Builder: Builder<Output = Self>;

    fn builder() -> Self::Builder;

    /// Fresh builder seeded with a copy of every field of `self`.
    fn to_builder(&self) -> Self::Builder;
}

/// Builder state shared by every element: id, extensions and the policy.
#[derive(Debug, Clone, Default)]
pub struct ElementBuilderCore {
    id: Option<String>,
    extension: ListSlot<Extension>,
    policy: ValidationPolicy,
}

impl ElementBuilderCore {
    pub fn from_common(common: &ElementCommon) -> Self {
        Self {
            id: common.id.clone(),
            extension: ListSlot::seeded(&common.extension),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ValidationPolicy {
        &mut self.policy
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn extension_mut(&mut self) -> &mut ListSlot<Extension> {
        &mut self.extension
    }

    pub fn is_populated(&self) -> bool {
        self.id.is_some() || !self.extension.is_empty()
    }

    pub fn freeze(self) -> ValidationResult<ElementCommon> {
        Ok(ElementCommon {
            id: self.id,
            extension: self
                .extension
                .freeze("extension", "Extension", self.policy.validating)?,
        })
    }
}

/// Builder state shared by backbone elements.
#[derive(Debug, Clone, Default)]
pub struct BackboneBuilderCore {
    element: ElementBuilderCore,
    modifier_extension: ListSlot<Extension>,
}

impl BackboneBuilderCore {
    pub fn from_common(common: &BackboneCommon) -> Self {
        Self {
            element: ElementBuilderCore::from_common(&common.element),
            modifier_extension: ListSlot::seeded(&common.modifier_extension),
        }
    }

    pub fn element_mut(&mut self) -> &mut ElementBuilderCore {
        &mut self.element
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.element.policy()
    }

    pub fn modifier_extension_mut(&mut self) -> &mut ListSlot<Extension> {
        &mut self.modifier_extension
    }

    pub fn is_populated(&self) -> bool {
        self.element.is_populated() || !self.modifier_extension.is_empty()
    }

    pub fn freeze(self) -> ValidationResult<BackboneCommon> {
        let validating = self.element.policy().validating;
        Ok(BackboneCommon {
            element: self.element.freeze()?,
            modifier_extension: self.modifier_extension.freeze(
                "modifierExtension",
                "Extension",
                validating,
            )?,
        })
    }
}

/// Setters for the fields every element declares.
pub trait ElementBuilder: Builder {
    fn element_core(&mut self) -> &mut ElementBuilderCore;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.element_core().set_id(Some(id.into()));
        self
    }

    fn clear_id(mut self) -> Self {
        self.element_core().set_id(None);
        self
    }

    /// Append extensions. Absent members make a validating `build()` fail.
    fn extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.element_core().extension_mut().append(items);
        self
    }

    /// Replace the extension list.
    fn set_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.element_core().extension_mut().replace(items);
        self
    }
}

/// Setters for backbone elements, adding modifier extensions.
pub trait BackboneBuilder: ElementBuilder {
    fn backbone_core(&mut self) -> &mut BackboneBuilderCore;

    fn modifier_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.backbone_core().modifier_extension_mut().append(items);
        self
    }

    fn set_modifier_extension<I>(mut self, items: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Option<Extension>>,
    {
        self.backbone_core().modifier_extension_mut().replace(items);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_validates_and_is_lenient() {
        let policy = ValidationPolicy::default();
        assert!(policy.validating);
        assert!(policy.lenient_untyped_references);
        assert!(!ValidationPolicy::trusted().validating);
        assert!(!ValidationPolicy::strict().lenient_untyped_references);
    }

    #[test]
    fn empty_core_is_not_populated() {
        let core = ElementBuilderCore::default();
        assert!(!core.is_populated());
        let common = core.freeze().unwrap();
        assert_eq!(common, ElementCommon::default());
    }
}
