//! The open choice over every datatype kind.

use crate::domain::{Choice, DataKind, Element, Visitable, Visitor};
use crate::types::{
    CodeableConcept, Coding, Code, FhirBoolean, FhirDateTime, FhirDecimal, FhirString, Id,
    Identifier, Integer, Period, Reference, Uri,
};

/// A datatype value of any kind.
///
/// Builders accept choice values as `DataValue` and narrow them to the
/// field's declared alternatives at build time. Extension values keep the
/// open form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataValue {
    Boolean(FhirBoolean),
    Integer(Integer),
    Decimal(FhirDecimal),
    String(FhirString),
    Uri(Uri),
    Code(Code),
    Id(Id),
    DateTime(FhirDateTime),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Identifier(Identifier),
    Period(Period),
    Reference(Reference),
}

macro_rules! data_value_dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            DataValue::Boolean($inner) => $body,
            DataValue::Integer($inner) => $body,
            DataValue::Decimal($inner) => $body,
            DataValue::String($inner) => $body,
            DataValue::Uri($inner) => $body,
            DataValue::Code($inner) => $body,
            DataValue::Id($inner) => $body,
            DataValue::DateTime($inner) => $body,
            DataValue::Coding($inner) => $body,
            DataValue::CodeableConcept($inner) => $body,
            DataValue::Identifier($inner) => $body,
            DataValue::Period($inner) => $body,
            DataValue::Reference($inner) => $body,
        }
    };
}

impl DataValue {
    pub fn kind(&self) -> DataKind {
        match self {
            DataValue::Boolean(_) => DataKind::Boolean,
            DataValue::Integer(_) => DataKind::Integer,
            DataValue::Decimal(_) => DataKind::Decimal,
            DataValue::String(_) => DataKind::String,
            DataValue::Uri(_) => DataKind::Uri,
            DataValue::Code(_) => DataKind::Code,
            DataValue::Id(_) => DataKind::Id,
            DataValue::DateTime(_) => DataKind::DateTime,
            DataValue::Coding(_) => DataKind::Coding,
            DataValue::CodeableConcept(_) => DataKind::CodeableConcept,
            DataValue::Identifier(_) => DataKind::Identifier,
            DataValue::Period(_) => DataKind::Period,
            DataValue::Reference(_) => DataKind::Reference,
        }
    }

    /// The held value as an element.
    pub fn as_element(&self) -> &dyn Element {
        data_value_dispatch!(self, inner => inner as &dyn Element)
    }

    /// Downcast the held value to a concrete node type.
    pub fn get<T: Element>(&self) -> Option<&T> {
        self.as_element().as_any().downcast_ref::<T>()
    }

    pub fn has_content(&self) -> bool {
        self.as_element().has_content()
    }
}

impl Choice for DataValue {
    const ALTERNATIVES: &'static [DataKind] = DataKind::ALL;

    fn kind(&self) -> DataKind {
        DataValue::kind(self)
    }

    fn into_value(self) -> DataValue {
        self
    }

    fn from_value(value: DataValue) -> Option<Self> {
        Some(value)
    }

    fn accept_alternative<V: Visitor + ?Sized>(
        &self,
        name: &str,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        data_value_dispatch!(self, inner => inner.accept(name, None, visitor))
    }
}

macro_rules! data_value_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for DataValue {
                fn from(value: $ty) -> Self {
                    DataValue::$variant(value)
                }
            }
        )+
    };
}

data_value_from!(
    Boolean(FhirBoolean),
    Integer(Integer),
    Decimal(FhirDecimal),
    String(FhirString),
    Uri(Uri),
    Code(Code),
    Id(Id),
    DateTime(FhirDateTime),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Identifier(Identifier),
    Period(Period),
    Reference(Reference),
);
