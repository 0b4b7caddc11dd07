//! Period: a time range defined by optional start and end.

use std::any::Any;

use tracing::{debug, instrument};

use crate::domain::{
    accept_opt, memo_hash, require_value_or_children, walk, Buildable, Builder, Constraint,
    ConstraintLevel, Element, ElementBuilder, ElementBuilderCore, ElementCommon, ElementInfo,
    HashMemo, ModelType, TypeCategory, TypeInfo, ValidationPolicy, ValidationResult, Visitable,
    Visitor,
};
use crate::macros::{impl_extensible, impl_node_hash};
use crate::types::FhirDateTime;

static ELEMENTS: [ElementInfo; 2] = [
    ElementInfo::scalar("start", "dateTime").summary(),
    ElementInfo::scalar("end", "dateTime").summary(),
];

static CONSTRAINTS: [Constraint; 1] = [Constraint {
    id: "per-1",
    level: ConstraintLevel::Rule,
    location: "(base)",
    description: "If present, start SHALL have a lower or equal value than end",
    expression: "start.hasValue().not() or end.hasValue().not() or (start <= end)",
    source: "http://hl7.org/fhir/StructureDefinition/Period",
    generated: false,
}];

static TYPE_INFO: TypeInfo = TypeInfo {
    name: "Period",
    category: TypeCategory::DataType,
    elements: &ELEMENTS,
    constraints: &CONSTRAINTS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    common: ElementCommon,
    start: Option<FhirDateTime>,
    end: Option<FhirDateTime>,
    memo: HashMemo,
}

impl Period {
    pub fn start(&self) -> Option<&FhirDateTime> {
        self.start.as_ref()
    }

    /// Open-ended when absent.
    pub fn end(&self) -> Option<&FhirDateTime> {
        self.end.as_ref()
    }
}

impl Element for Period {
    fn type_name(&self) -> &'static str {
        TYPE_INFO.name
    }

    fn has_content(&self) -> bool {
        self.common.has_content() || self.start.is_some() || self.end.is_some()
    }

    fn stable_hash(&self) -> u64 {
        self.memo
            .get_or_compute(|| memo_hash(&(TYPE_INFO.name, &self.common, &self.start, &self.end)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Visitable for Period {
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        walk(self, name, index, visitor, |visitor| {
            self.common.accept_children(visitor)?;
            accept_opt(&self.start, "start", visitor)?;
            accept_opt(&self.end, "end", visitor)
        })
    }
}

impl ModelType for Period {
    fn type_info() -> &'static TypeInfo {
        &TYPE_INFO
    }
}

impl_node_hash!(Period);
impl_extensible!(Period);

impl Buildable for Period {
    type Builder = PeriodBuilder;

    fn builder() -> PeriodBuilder {
        PeriodBuilder::default()
    }

    fn to_builder(&self) -> PeriodBuilder {
        PeriodBuilder::from(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeriodBuilder {
    core: ElementBuilderCore,
    start: Option<FhirDateTime>,
    end: Option<FhirDateTime>,
}

impl PeriodBuilder {
    pub fn start(mut self, start: impl Into<Option<FhirDateTime>>) -> Self {
        self.start = start.into();
        self
    }

    pub fn end(mut self, end: impl Into<Option<FhirDateTime>>) -> Self {
        self.end = end.into();
        self
    }
}

impl From<&Period> for PeriodBuilder {
    fn from(period: &Period) -> Self {
        Self {
            core: ElementBuilderCore::from_common(&period.common),
            start: period.start.clone(),
            end: period.end.clone(),
        }
    }
}

impl ElementBuilder for PeriodBuilder {
    fn element_core(&mut self) -> &mut ElementBuilderCore {
        &mut self.core
    }
}

impl Builder for PeriodBuilder {
    type Output = Period;

    fn policy_mut(&mut self) -> &mut ValidationPolicy {
        self.core.policy_mut()
    }

    fn is_populated(&self) -> bool {
        self.core.is_populated() || self.start.is_some() || self.end.is_some()
    }

    #[instrument(level = "trace", skip(self))]
    fn build(self) -> ValidationResult<Period> {
        let validating = self.core.policy().validating;
        let built = Period {
            common: self.core.freeze()?,
            start: self.start,
            end: self.end,
            memo: HashMemo::new(),
        };
        if validating {
            require_value_or_children(&built)?;
        }
        debug!(type_name = TYPE_INFO.name, "built");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn empty_period_is_rejected() {
        let err = Period::builder().build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyRecord {
                type_name: "Period".into()
            }
        );
    }

    #[test]
    fn open_ended_period_builds() {
        let period = Period::builder()
            .start(FhirDateTime::parse("2024-01").unwrap())
            .build()
            .unwrap();
        assert!(period.end().is_none());
        assert_eq!(
            period.start().and_then(|s| s.value_text()).as_deref(),
            Some("2024-01")
        );
    }

    #[test]
    fn declares_start_before_end_rule() {
        let info = Period::type_info();
        assert_eq!(info.constraints[0].id, "per-1");
        assert_eq!(info.constraints[0].level, ConstraintLevel::Rule);
    }
}
