//! Traversal protocol: a declaration-ordered, depth-first walk over built records.
//!
//! Each node runs five phases in fixed order:
//! `pre_visit` (veto, skips the node and its subtree), `visit_start`, `visit`
//! (returning `false` skips the children), then `visit_end` and `post_visit`,
//! which always run once the node was not vetoed.
//!
//! Children are walked in declaration order, inherited common fields first.
//! Encoders rely on this order to produce schema-ordered output.

use crate::domain::choice::{choice_element_name, Choice};
use crate::domain::element::Element;

/// Caller-supplied observer of a traversal.
///
/// Every hook has a pass-through default, so visitors override only what they
/// need. Errors returned by a hook abort the walk and propagate unchanged.
pub trait Visitor {
    type Error;

    /// Veto hook. Returning `false` skips the node entirely.
    fn pre_visit(&mut self, _node: &dyn Element) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn visit_start(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Primary hook. Returning `false` skips the children of `node`.
    fn visit(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn visit_end(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn post_visit(&mut self, _node: &dyn Element) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Plain string attributes (element `id`, extension `url`).
    fn visit_attribute(&mut self, _name: &str, _value: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Announces a non-empty list field before its members are walked.
    fn visit_list_start(
        &mut self,
        _name: &str,
        _len: usize,
        _element_kind: &str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_list_end(
        &mut self,
        _name: &str,
        _len: usize,
        _element_kind: &str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Double-dispatch entry point implemented by every node type.
pub trait Visitable: Element {
    /// Run the five-phase contract for this node under `name`.
    ///
    /// `index` is the position within the owning list field, `None` for
    /// scalar fields and roots.
    fn accept<V: Visitor + ?Sized>(
        &self,
        name: &str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> Result<(), V::Error>;

    /// Walk this node as a traversal root, named after its type.
    fn walk_with<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        Self: Sized,
    {
        self.accept(self.type_name(), None, visitor)
    }
}

/// The five-phase contract, shared by every node type.
///
/// `children` walks the node's declared fields and runs only when `visit`
/// returned `true`.
pub fn walk<N, V, F>(
    node: &N,
    name: &str,
    index: Option<usize>,
    visitor: &mut V,
    children: F,
) -> Result<(), V::Error>
where
    N: Element,
    V: Visitor + ?Sized,
    F: FnOnce(&mut V) -> Result<(), V::Error>,
{
    if !visitor.pre_visit(node)? {
        return Ok(());
    }
    visitor.visit_start(name, index, node)?;
    if visitor.visit(name, index, node)? {
        children(visitor)?;
    }
    visitor.visit_end(name, index, node)?;
    visitor.post_visit(node)
}

/// Walk an optional scalar field.
pub fn accept_opt<T, V>(value: &Option<T>, name: &str, visitor: &mut V) -> Result<(), V::Error>
where
    T: Visitable,
    V: Visitor + ?Sized,
{
    match value {
        Some(node) => node.accept(name, None, visitor),
        None => Ok(()),
    }
}

/// Walk a list field: list hooks around each member in insertion order.
///
/// Empty lists are skipped without announcing them.
pub fn accept_list<T, V>(
    items: &[T],
    name: &str,
    element_kind: &str,
    visitor: &mut V,
) -> Result<(), V::Error>
where
    T: Visitable,
    V: Visitor + ?Sized,
{
    if items.is_empty() {
        return Ok(());
    }
    visitor.visit_list_start(name, items.len(), element_kind)?;
    for (index, item) in items.iter().enumerate() {
        item.accept(name, Some(index), visitor)?;
    }
    visitor.visit_list_end(name, items.len(), element_kind)
}

pub fn accept_attribute<V>(value: &Option<String>, name: &str, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor + ?Sized,
{
    match value {
        Some(value) => visitor.visit_attribute(name, value),
        None => Ok(()),
    }
}

/// Walk a choice field: dispatch to the held alternative under its
/// type-specific name, e.g. `occurrence` holding a period is announced as
/// `occurrencePeriod`.
pub fn accept_choice<C, V>(value: &Option<C>, name: &str, visitor: &mut V) -> Result<(), V::Error>
where
    C: Choice,
    V: Visitor + ?Sized,
{
    match value {
        Some(choice) => {
            choice.accept_alternative(&choice_element_name(name, choice.kind()), visitor)
        }
        None => Ok(()),
    }
}
