//! Element paths of a built record, in traversal order.

use std::convert::Infallible;

use itertools::Itertools;

use crate::domain::{Element, Visitable, Visitor};

/// One visited element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Dotted path from the root, e.g. `Account.subject[0].reference`.
    pub path: String,
    pub type_name: &'static str,
    /// Lexical value of primitives.
    pub value: Option<String>,
}

/// Collects the path of every element below a root.
///
/// Choice alternatives appear under their type-specific names
/// (`AdverseEvent.occurrencePeriod.start`).
#[derive(Debug, Default)]
pub struct PathCollector {
    segments: Vec<String>,
    entries: Vec<PathEntry>,
    max_depth: Option<usize>,
}

impl PathCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not descend below `depth` segments; the root is depth 1.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn collect<T: Visitable>(mut self, node: &T) -> Vec<PathEntry> {
        match node.walk_with(&mut self) {
            Ok(()) => self.entries,
            Err(never) => match never {},
        }
    }

    pub fn paths<T: Visitable>(node: &T) -> Vec<String> {
        Self::new()
            .collect(node)
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    }

    fn current_path(&self) -> String {
        self.segments.iter().join(".")
    }
}

impl Visitor for PathCollector {
    type Error = Infallible;

    fn visit_start(
        &mut self,
        name: &str,
        index: Option<usize>,
        node: &dyn Element,
    ) -> Result<(), Infallible> {
        let segment = match index {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_string(),
        };
        self.segments.push(segment);
        self.entries.push(PathEntry {
            path: self.current_path(),
            type_name: node.type_name(),
            value: node.value_text(),
        });
        Ok(())
    }

    fn visit(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<bool, Infallible> {
        Ok(self
            .max_depth
            .map_or(true, |max| self.segments.len() < max))
    }

    fn visit_end(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<(), Infallible> {
        self.segments.pop();
        Ok(())
    }
}
