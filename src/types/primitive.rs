//! Primitive datatypes: one generic node shape parameterized by its value kind.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;
use uuid::Uuid;

use crate::domain::{
    memo_hash, require_value_or_children, walk, Buildable, Builder, DataKind, Element,
    ElementBuilder, ElementBuilderCore, ElementCommon, Extensible, HashMemo, ModelType,
    TypeCategory, TypeInfo, ValidationError, ValidationResult, Visitable, Visitor,
};
use crate::types::{DateTimeValue, Extension};

/// Maximum size of a string value.
pub const MAX_STRING_BYTES: usize = 1024 * 1024;

/// Value kind of a primitive: its Rust value type and lexical rules.
pub trait PrimitiveKind: Send + Sync + 'static {
    type Value: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static;

    const TYPE_NAME: &'static str;
    const KIND: DataKind;

    fn type_info() -> &'static TypeInfo;

    /// Lexical check run by a validating build; `Err` carries the reason.
    fn check(_value: &Self::Value) -> Result<(), String> {
        Ok(())
    }

    fn lexical(value: &Self::Value) -> String;

    /// Value identity used by equality and hashing.
    fn same_value(a: &Self::Value, b: &Self::Value) -> bool {
        a == b
    }

    fn hash_value<H: Hasher>(value: &Self::Value, state: &mut H) {
        value.hash(state);
    }
}

/// Value set of a required terminology binding, one variant per code.
pub trait CodeEnum: Copy + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    /// Canonical url of the bound value set.
    const VALUE_SET: &'static str;
    const ALL: &'static [Self];

    fn code(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

macro_rules! primitive_info {
    ($name:literal) => {{
        static INFO: TypeInfo = TypeInfo {
            name: $name,
            category: TypeCategory::Primitive,
            elements: &[],
            constraints: &[],
        };
        &INFO
    }};
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

fn check_pattern(value: &str, regex: &Regex, expected: &str) -> Result<(), String> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(format!("does not match {expected}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanKind;

impl PrimitiveKind for BooleanKind {
    type Value = bool;
    const TYPE_NAME: &'static str = "boolean";
    const KIND: DataKind = DataKind::Boolean;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("boolean")
    }

    fn lexical(value: &bool) -> String {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerKind;

impl PrimitiveKind for IntegerKind {
    type Value = i32;
    const TYPE_NAME: &'static str = "integer";
    const KIND: DataKind = DataKind::Integer;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("integer")
    }

    fn lexical(value: &i32) -> String {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalKind;

impl PrimitiveKind for DecimalKind {
    type Value = Decimal;
    const TYPE_NAME: &'static str = "decimal";
    const KIND: DataKind = DataKind::Decimal;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("decimal")
    }

    fn lexical(value: &Decimal) -> String {
        value.to_string()
    }

    // `Decimal` equality ignores scale; `1.0` and `1.00` are distinct values here.
    fn same_value(a: &Decimal, b: &Decimal) -> bool {
        a.mantissa() == b.mantissa() && a.scale() == b.scale()
    }

    fn hash_value<H: Hasher>(value: &Decimal, state: &mut H) {
        (value.mantissa(), value.scale()).hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringKind;

impl PrimitiveKind for StringKind {
    type Value = String;
    const TYPE_NAME: &'static str = "string";
    const KIND: DataKind = DataKind::String;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("string")
    }

    fn check(value: &String) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("must contain non-whitespace content".to_string());
        }
        if value.len() > MAX_STRING_BYTES {
            return Err(format!("exceeds {MAX_STRING_BYTES} bytes"));
        }
        Ok(())
    }

    fn lexical(value: &String) -> String {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UriKind;

impl PrimitiveKind for UriKind {
    type Value = String;
    const TYPE_NAME: &'static str = "uri";
    const KIND: DataKind = DataKind::Uri;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("uri")
    }

    fn check(value: &String) -> Result<(), String> {
        static URI: OnceLock<Regex> = OnceLock::new();
        check_pattern(value, pattern(&URI, r"^\S+$"), "a uri without whitespace")
    }

    fn lexical(value: &String) -> String {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeKind;

impl PrimitiveKind for CodeKind {
    type Value = String;
    const TYPE_NAME: &'static str = "code";
    const KIND: DataKind = DataKind::Code;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("code")
    }

    fn check(value: &String) -> Result<(), String> {
        static CODE: OnceLock<Regex> = OnceLock::new();
        check_pattern(value, pattern(&CODE, r"^[^\s]+( [^\s]+)*$"), "a code token")
    }

    fn lexical(value: &String) -> String {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdKind;

impl PrimitiveKind for IdKind {
    type Value = String;
    const TYPE_NAME: &'static str = "id";
    const KIND: DataKind = DataKind::Id;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("id")
    }

    fn check(value: &String) -> Result<(), String> {
        static ID: OnceLock<Regex> = OnceLock::new();
        check_pattern(value, pattern(&ID, r"^[A-Za-z0-9\-\.]{1,64}$"), "[A-Za-z0-9-.]{1,64}")
    }

    fn lexical(value: &String) -> String {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeKind;

impl PrimitiveKind for DateTimeKind {
    type Value = DateTimeValue;
    const TYPE_NAME: &'static str = "dateTime";
    const KIND: DataKind = DataKind::DateTime;

    fn type_info() -> &'static TypeInfo {
        primitive_info!("dateTime")
    }

    fn lexical(value: &DateTimeValue) -> String {
        value.to_string()
    }
}

/// A `code` restricted to the value set `E`.
pub struct Coded<E>(PhantomData<fn() -> E>);

impl<E: CodeEnum> PrimitiveKind for Coded<E> {
    type Value = E;
    const TYPE_NAME: &'static str = "code";
    const KIND: DataKind = DataKind::Code;

    fn type_info() -> &'static TypeInfo {
        CodeKind::type_info()
    }

    fn lexical(value: &E) -> String {
        value.code().to_string()
    }
}

pub type FhirBoolean = Primitive<BooleanKind>;
pub type Integer = Primitive<IntegerKind>;
pub type FhirDecimal = Primitive<DecimalKind>;
pub type FhirString = Primitive<StringKind>;
pub type Uri = Primitive<UriKind>;
pub type Code = Primitive<CodeKind>;
pub type Id = Primitive<IdKind>;
pub type FhirDateTime = Primitive<DateTimeKind>;
pub type Enumerated<E> = Primitive<Coded<E>>;

/// A primitive node: an optional value plus the common element fields.
pub struct Primitive<K: PrimitiveKind> {
    common: ElementCommon,
    value: Option<K::Value>,
    memo: HashMemo,
}

impl<K: PrimitiveKind> Primitive<K> {
    /// Trusted construction of a value already known to be lexically valid.
    fn from_valid(value: K::Value) -> Self {
        Self {
            common: ElementCommon::default(),
            value: Some(value),
            memo: HashMemo::new(),
        }
    }

    /// Build a primitive holding `value`, running the lexical check.
    pub fn of(value: impl Into<K::Value>) -> ValidationResult<Self> {
        let value: K::Value = value.into();
        Self::builder().value(value).build()
    }

    pub fn value(&self) -> Option<&K::Value> {
        self.value.as_ref()
    }
}

impl Primitive<StringKind> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Primitive<UriKind> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Primitive<CodeKind> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Primitive<IdKind> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Fresh random logical id.
    pub fn generate() -> Self {
        Self::from_valid(Uuid::new_v4().to_string())
    }
}

impl Primitive<DateTimeKind> {
    /// Parse a partial-precision date/time, e.g. `2024-03` or `2024-03-09T10:15:00Z`.
    pub fn parse(text: &str) -> ValidationResult<Self> {
        let value = text.parse::<DateTimeValue>().map_err(|reason| ValidationError::InvalidValue {
            type_name: DateTimeKind::TYPE_NAME.to_string(),
            value: text.to_string(),
            reason,
        })?;
        Ok(Self::from_valid(value))
    }
}

impl Primitive<DecimalKind> {
    /// Parse a decimal keeping its written precision, e.g. `1.50`.
    pub fn parse(text: &str) -> ValidationResult<Self> {
        let value = text.trim().parse::<Decimal>().map_err(|err| ValidationError::InvalidValue {
            type_name: DecimalKind::TYPE_NAME.to_string(),
            value: text.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self::from_valid(value))
    }
}

impl<E: CodeEnum> Primitive<Coded<E>> {
    pub fn code(&self) -> Option<E> {
        self.value
    }

    /// Resolve a code against the bound value set.
    pub fn parse_code(code: &str) -> ValidationResult<Self> {
        E::from_code(code)
            .map(Self::from_valid)
            .ok_or_else(|| ValidationError::InvalidValue {
                type_name: Coded::<E>::TYPE_NAME.to_string(),
                value: code.to_string(),
                reason: format!("not in value set {}", E::VALUE_SET),
            })
    }
}

impl From<bool> for FhirBoolean {
    fn from(value: bool) -> Self {
        Self::from_valid(value)
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self::from_valid(value)
    }
}

impl From<Decimal> for FhirDecimal {
    fn from(value: Decimal) -> Self {
        Self::from_valid(value)
    }
}

impl From<DateTimeValue> for FhirDateTime {
    fn from(value: DateTimeValue) -> Self {
        Self::from_valid(value)
    }
}

impl<E: CodeEnum> From<E> for Enumerated<E> {
    fn from(value: E) -> Self {
        Self::from_valid(value)
    }
}

impl<K: PrimitiveKind> Clone for Primitive<K> {
    fn clone(&self) -> Self {
        Self {
            common: self.common.clone(),
            value: self.value.clone(),
            memo: self.memo.clone(),
        }
    }
}

impl<K: PrimitiveKind> fmt::Debug for Primitive<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::TYPE_NAME)
            .field("common", &self.common)
            .field("value", &self.value)
            .finish()
    }
}

impl<K: PrimitiveKind> PartialEq for Primitive<K> {
    fn eq(&self, other: &Self) -> bool {
        self.common == other.common
            && match (&self.value, &other.value) {
                (Some(a), Some(b)) => K::same_value(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl<K: PrimitiveKind> Eq for Primitive<K> {}

impl<K: PrimitiveKind> Hash for Primitive<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.stable_hash());
    }
}

struct ValueKey<'a, K: PrimitiveKind>(&'a Option<K::Value>);

impl<K: PrimitiveKind> Hash for ValueKey<'_, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Some(value) => {
                state.write_u8(1);
                K::hash_value(value, state);
            }
            None => state.write_u8(0),
        }
    }
}

impl<K: PrimitiveKind> Element for Primitive<K> {
    fn type_name(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn has_content(&self) -> bool {
        self.value.is_some() || self.common.has_content()
    }

    fn stable_hash(&self) -> u64 {
        self.memo
            .get_or_compute(|| {
                memo_hash(&(K::TYPE_NAME, &self.common, ValueKey::<K>(&self.value)))
            })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn value_text(&self) -> Option<String> {
        self.value.as_ref().map(K::lexical)
    }
}

impl<K: PrimitiveKind> Visitable for Primitive<K> {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)
        })
    }
}

impl<K: PrimitiveKind> ModelType for Primitive<K> {
    fn type_info() -> &'static TypeInfo {
        K::type_info()
    }
}

impl<K: PrimitiveKind> Extensible for Primitive<K> {
    fn element_id(&self) -> Option<&str> {
        self.common.id()
    }

    fn extension(&self) -> &[Extension] {
        self.common.extension()
    }
}

impl<K: PrimitiveKind> Buildable for Primitive<K> {
    type Builder = PrimitiveBuilder<K>;

    fn builder() -> PrimitiveBuilder<K> {
        PrimitiveBuilder::default()
    }

    fn to_builder(&self) -> PrimitiveBuilder<K> {
        PrimitiveBuilder {
            core: ElementBuilderCore::from_common(&self.common),
            value: self.value.clone(),
        }
    }
}

/// Builder shared by every primitive kind.
pub struct PrimitiveBuilder<K: PrimitiveKind> {
    core: ElementBuilderCore,
    value: Option<K::Value>,
}

impl<K: PrimitiveKind> Default for PrimitiveBuilder<K> {
    fn default() -> Self {
        Self {
            core: ElementBuilderCore::default(),
            value: None,
        }
    }
}

impl<K: PrimitiveKind> Clone for PrimitiveBuilder<K> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K: PrimitiveKind> fmt::Debug for PrimitiveBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveBuilder")
            .field("type", &K::TYPE_NAME)
            .field("core", &self.core)
            .field("value", &self.value)
            .finish()
    }
}

impl<K: PrimitiveKind> PrimitiveBuilder<K> {
    pub fn value(mut self, value: impl Into<Option<K::Value>>) -> Self {
        self.value = value.into();
        self
    }
}

impl<K: PrimitiveKind> ElementBuilder for PrimitiveBuilder<K> {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl<K: PrimitiveKind> Builder for PrimitiveBuilder<K> {
    type Output = Primitive<K>;

    fn policy_mut(&mut self) -> &mut crate::domain::ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.value.is_some() || self.core.is_populated()
    }

    fn build(self) -> ValidationResult<Primitive<K>> {
        let validating = self.core.policy().validating;
        if validating {
            if let Some(value) = &self.value {
                K::check(value).map_err(|reason| ValidationError::InvalidValue {
                    type_name: K::TYPE_NAME.to_string(),
                    value: K::lexical(value),
                    reason,
                })?;
            }
        }
        let built = Primitive {
            common: self.core.freeze()?,
            value: self.value,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        trace!(type_name = K::TYPE_NAME, "built primitive");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Flag {
        On,
        Off,
    }

    impl CodeEnum for Flag {
        const VALUE_SET: &'static str = "urn:test:flag";
        const ALL: &'static [Self] = &[Flag::On, Flag::Off];

        fn code(self) -> &'static str {
            match self {
                Flag::On => "on",
                Flag::Off => "off",
            }
        }
    }

    #[test]
    fn string_rejects_blank_value() {
        let err = FhirString::of("   ").unwrap_err();
        assert_eq!(err.rule(), "lexical");
        assert!(FhirString::of("text").is_ok());
    }

    #[test]
    fn code_and_id_patterns() {
        assert!(Code::of("entered-in-error").is_ok());
        assert!(Code::of(" leading").is_err());
        assert!(Id::of("abc.123-x").is_ok());
        assert!(Id::of("has space").is_err());
        assert!(Id::generate().as_str().map(|s| s.len() == 36).unwrap_or(false));
    }

    #[test]
    fn empty_primitive_is_rejected() {
        let err = FhirString::builder().build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyRecord {
                type_name: "string".into()
            }
        );
    }

    #[test]
    fn primitive_with_only_extension_has_content() {
        let ext = Extension::builder()
            .url("urn:test:ext")
            .value(FhirBoolean::from(true))
            .build()
            .unwrap();
        let s = FhirString::builder().extension([ext]).build().unwrap();
        assert!(s.has_content());
        assert_eq!(s.value_text(), None);
    }

    #[test]
    fn enumerated_parses_known_codes_only() {
        let on = Enumerated::<Flag>::parse_code("on").unwrap();
        assert_eq!(on.code(), Some(Flag::On));
        assert_eq!(on.value_text().as_deref(), Some("on"));
        assert!(Enumerated::<Flag>::parse_code("maybe").is_err());
        assert_eq!(Enumerated::from(Flag::Off).type_name(), "code");
    }

    #[test]
    fn trusted_build_skips_lexical_check() {
        let s = FhirString::builder()
            .value(String::new())
            .validating(false)
            .build()
            .unwrap();
        assert_eq!(s.as_str(), Some(""));
    }
}
