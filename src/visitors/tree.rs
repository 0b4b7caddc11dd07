//! Render a built record as a `termtree` for debug display.

use std::convert::Infallible;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Element, Visitable, Visitor};

/// Conversion of any visitable record into a printable tree.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: Visitable> TreeNodeConvert for T {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        let mut renderer = TreeRenderer::default();
        match self.walk_with(&mut renderer) {
            Ok(()) => renderer.finish(),
            Err(never) => match never {},
        }
    }
}

/// Visitor building one tree node per element, attributes as leaves.
///
/// Primitive nodes are labelled `name: value`, composites `name (Type)`.
#[derive(Debug, Default)]
pub struct TreeRenderer {
    stack: Vec<Tree<String>>,
    root: Option<Tree<String>>,
}

impl TreeRenderer {
    pub fn finish(self) -> Tree<String> {
        self.root
            .unwrap_or_else(|| Tree::new("<empty>".to_string()))
    }

    fn label(name: &str, index: Option<usize>, node: &dyn Element) -> String {
        let name = match index {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_string(),
        };
        match node.value_text() {
            Some(value) => format!("{name}: {value}"),
            None => format!("{name} ({})", node.type_name()),
        }
    }
}

impl Visitor for TreeRenderer {
    type Error = Infallible;

    fn visit_start(
        &mut self,
        name: &str,
        index: Option<usize>,
        node: &dyn Element,
    ) -> Result<(), Infallible> {
        self.stack.push(Tree::new(Self::label(name, index, node)));
        Ok(())
    }

    fn visit_end(
        &mut self,
        _name: &str,
        _index: Option<usize>,
        _node: &dyn Element,
    ) -> Result<(), Infallible> {
        if let Some(done) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => {
                    parent.push(done);
                }
                None => self.root = Some(done),
            }
        }
        Ok(())
    }

    fn visit_attribute(&mut self, name: &str, value: &str) -> Result<(), Infallible> {
        if let Some(current) = self.stack.last_mut() {
            current.push(Tree::new(format!("@{name}: {value}")));
        }
        Ok(())
    }
}
