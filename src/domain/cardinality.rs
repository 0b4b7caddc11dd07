//! Cardinality and list validation.
//!
//! Minimum/maximum occurrence is not enforced generically: a binding declares
//! it per element and composes [`require_non_null`] (minOccurs = 1) or
//! [`check_non_empty_list`] with the list checks below.

use tracing::warn;

use crate::domain::element::Element;
use crate::domain::error::{ValidationError, ValidationResult};

/// Fail when a required scalar is absent.
pub fn require_non_null<T>(value: &Option<T>, field: &str) -> ValidationResult<()> {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::MissingRequiredField {
            field: field.to_string(),
        }),
    }
}

/// Fail when any list member is absent.
pub fn check_list<T>(list: &[Option<T>], field: &str, element_kind: &str) -> ValidationResult<()> {
    if list.iter().any(Option::is_none) {
        return Err(ValidationError::NullListElement {
            field: field.to_string(),
            element_kind: element_kind.to_string(),
        });
    }
    Ok(())
}

/// Lists with minOccurs = 1: non-empty, then no absent members.
pub fn check_non_empty_list<T>(
    list: &[Option<T>],
    field: &str,
    element_kind: &str,
) -> ValidationResult<()> {
    if list.is_empty() {
        return Err(ValidationError::MissingRequiredField {
            field: field.to_string(),
        });
    }
    check_list(list, field, element_kind)
}

/// The "not entirely empty" rule: a node needs a value or at least one child.
pub fn require_value_or_children(node: &dyn Element) -> ValidationResult<()> {
    if node.has_content() {
        return Ok(());
    }
    Err(ValidationError::EmptyRecord {
        type_name: node.type_name().to_string(),
    })
}

/// Builder-side accumulator for one list field.
///
/// Members may be absent until the list is frozen; freezing with validation
/// enabled rejects absent members, otherwise they are dropped.
#[derive(Debug, Clone)]
pub struct ListSlot<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for ListSlot<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ListSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the members of a built list.
    pub fn seeded(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self {
            items: items.iter().cloned().map(Some).collect(),
        }
    }

    /// Add members to the end of the list.
    pub fn append<I>(&mut self, items: impl IntoIterator<Item = I>)
    where
        I: Into<Option<T>>,
    {
        self.items.extend(items.into_iter().map(Into::into));
    }

    /// Replace the whole list.
    pub fn replace<I>(&mut self, items: impl IntoIterator<Item = I>)
    where
        I: Into<Option<T>>,
    {
        self.items.clear();
        self.append(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<T>] {
        &self.items
    }

    /// Freeze into the immutable member list of a built record.
    pub fn freeze(self, field: &str, element_kind: &str, validating: bool) -> ValidationResult<Vec<T>> {
        if validating {
            check_list(&self.items, field, element_kind)?;
        }
        let len = self.items.len();
        let frozen: Vec<T> = self.items.into_iter().flatten().collect();
        if frozen.len() != len {
            warn!(field, dropped = len - frozen.len(), "dropping absent list members");
        }
        Ok(frozen)
    }

    /// Freeze a list with minOccurs = 1.
    pub fn freeze_non_empty(
        self,
        field: &str,
        element_kind: &str,
        validating: bool,
    ) -> ValidationResult<Vec<T>> {
        if validating {
            check_non_empty_list(&self.items, field, element_kind)?;
        }
        self.freeze(field, element_kind, validating)
    }
}
