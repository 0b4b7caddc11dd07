//! Lookup of binding metadata by type name, for layers that only know names
//! (decoders, path tools).

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::trace;

use crate::domain::{DataKind, ElementInfo, ModelType, TypeCategory, TypeInfo};
use crate::resource::{Account, AdverseEvent, Guarantor, Participant, RESOURCE_TYPE_NAMES};
use crate::types::{
    BooleanKind, CodeKind, CodeableConcept, Coding, DateTimeKind, DecimalKind, Extension, IdKind,
    Identifier, IntegerKind, Period, PrimitiveKind, Reference, StringKind, UriKind,
};

fn registry() -> &'static HashMap<&'static str, &'static TypeInfo> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static TypeInfo>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let infos = [
            BooleanKind::type_info(),
            IntegerKind::type_info(),
            DecimalKind::type_info(),
            StringKind::type_info(),
            UriKind::type_info(),
            CodeKind::type_info(),
            IdKind::type_info(),
            DateTimeKind::type_info(),
            Coding::type_info(),
            CodeableConcept::type_info(),
            Identifier::type_info(),
            Period::type_info(),
            Reference::type_info(),
            Extension::type_info(),
            Account::type_info(),
            Guarantor::type_info(),
            AdverseEvent::type_info(),
            Participant::type_info(),
        ];
        trace!(types = infos.len(), "registry initialised");
        infos.into_iter().map(|info| (info.name, info)).collect()
    })
}

/// Metadata of a node type, by schema name (`"Period"`, `"Account.Guarantor"`).
pub fn type_info(type_name: &str) -> Option<&'static TypeInfo> {
    registry().get(type_name).copied()
}

pub fn element_info(type_name: &str, element_name: &str) -> Option<&'static ElementInfo> {
    type_info(type_name)?.element(element_name)
}

pub fn is_choice_element(type_name: &str, element_name: &str) -> bool {
    element_info(type_name, element_name).is_some_and(ElementInfo::is_choice)
}

/// Declared alternatives of a choice element; empty for other elements.
pub fn choice_element_types(type_name: &str, element_name: &str) -> &'static [DataKind] {
    element_info(type_name, element_name)
        .map(|info| info.choice_types)
        .unwrap_or(&[])
}

/// Allowed target types of a reference element; empty means any target.
pub fn reference_target_types(type_name: &str, element_name: &str) -> &'static [&'static str] {
    element_info(type_name, element_name)
        .map(|info| info.reference_types)
        .unwrap_or(&[])
}

pub fn is_resource_type(name: &str) -> bool {
    type_info(name).is_some_and(|info| info.category == TypeCategory::Resource)
}

pub fn resource_type_names() -> &'static [&'static str] {
    RESOURCE_TYPE_NAMES
}

/// Every registered type name, sorted.
pub fn type_names() -> Vec<&'static str> {
    let mut names: Vec<_> = registry().keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_name_is_registered_as_resource() {
        for name in resource_type_names() {
            assert!(is_resource_type(name), "{name}");
        }
        assert!(!is_resource_type("Period"));
        assert!(!is_resource_type("Account.Guarantor"));
    }

    #[test]
    fn backbone_types_are_registered_by_path() {
        let info = type_info("AdverseEvent.Participant").unwrap();
        assert_eq!(info.category, TypeCategory::Backbone);
        assert_eq!(
            reference_target_types("Account.Guarantor", "party"),
            &["Patient", "RelatedPerson", "Organization"]
        );
    }
}
