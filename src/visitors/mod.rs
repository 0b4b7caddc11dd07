//! Traversal tools built on the visitor protocol.

pub mod paths;
pub mod tree;

pub use paths::{PathCollector, PathEntry};
pub use tree::{TreeNodeConvert, TreeRenderer};
