//! Domain layer: the element model and its build/validate/traverse machinery
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod builder;
pub mod cardinality;
pub mod choice;
pub mod element;
pub mod error;
pub mod meta;
pub mod visitor;

pub use builder::{
    BackboneBuilder, BackboneBuilderCore, Buildable, Builder, ElementBuilder, ElementBuilderCore,
    ValidationPolicy,
};
pub use cardinality::{
    check_list, check_non_empty_list, require_non_null, require_value_or_children, ListSlot,
};
pub use choice::{
    check_reference_target, check_reference_targets, choice_element_name, resolve_choice,
    validate_choice, validate_reference_target, Choice, DataKind,
};
pub use element::{
    memo_hash, BackboneCommon, Element, ElementCommon, Extensible, HashMemo, ModifierExtensible,
};
pub use error::{ValidationError, ValidationResult};
pub use meta::{
    evaluate_constraints, Constraint, ConstraintEvaluator, ConstraintIssue, ConstraintLevel,
    ElementInfo, FieldShape, ModelType, TypeCategory, TypeInfo,
};
pub use visitor::{
    accept_attribute, accept_choice, accept_list, accept_opt, walk, Visitable, Visitor,
};
