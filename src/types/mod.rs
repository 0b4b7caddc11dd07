//! Datatype bindings: primitives and the general-purpose composite datatypes.

pub mod coding;
pub mod datetime;
pub mod extension;
pub mod identifier;
pub mod period;
pub mod primitive;
pub mod reference;
pub mod value;

pub use coding::{CodeableConcept, CodeableConceptBuilder, Coding, CodingBuilder};
pub use datetime::DateTimeValue;
pub use extension::{Extension, ExtensionBuilder};
pub use identifier::{Identifier, IdentifierBuilder};
pub use period::{Period, PeriodBuilder};
pub use primitive::{
    BooleanKind, Code, CodeEnum, CodeKind, Coded, DateTimeKind, DecimalKind, Enumerated,
    FhirBoolean, FhirDateTime, FhirDecimal, FhirString, Id, IdKind, Integer, IntegerKind,
    Primitive, PrimitiveBuilder, PrimitiveKind, StringKind, Uri, UriKind,
};
pub use reference::{Reference, ReferenceBuilder, STRUCTURE_DEFINITION_PREFIX};
pub use value::DataValue;
