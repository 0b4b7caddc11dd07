//! clinical-model: immutable clinical records with builders, build-time
//! validation and declaration-ordered traversal.
//!
//! Layers:
//! - `domain`: element/builder/visitor traits, validation errors and validators
//! - `types`: primitive and composite datatypes
//! - `resource`: root records (`Account`, `AdverseEvent`) and the `Resource` union
//! - `registry`: binding metadata lookup by type name
//! - `visitors`: traversal tools (path collection, tree rendering)
//! - `config`: layered model settings

mod macros;

pub mod config;
pub mod domain;
pub mod registry;
pub mod resource;
pub mod types;
pub mod util;
pub mod visitors;

/// Traits and types most callers need.
pub mod prelude {
    pub use crate::domain::{
        BackboneBuilder, Buildable, Builder, Choice, Element, ElementBuilder, Extensible,
        ModelType, ModifierExtensible, ValidationError, ValidationPolicy, ValidationResult,
        Visitable, Visitor,
    };
    pub use crate::resource::{
        Account, AccountStatus, AdverseEvent, AdverseEventActuality, AdverseEventStatus,
        DomainResourceBuilder, Resource,
    };
    pub use crate::types::{
        CodeEnum, CodeableConcept, Coding, DataValue, DateTimeValue, Extension, FhirDateTime,
        FhirString, Identifier, Period, Reference,
    };
}
