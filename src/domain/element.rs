//! Element core: the contract every node of the record tree satisfies.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::domain::visitor::{accept_attribute, accept_list, Visitor};
use crate::types::Extension;

/// A node in the record tree.
///
/// Object safe, so visitors and validators can receive any node as `&dyn Element`.
pub trait Element: Any + fmt::Debug + Send + Sync {
    /// Schema name of the concrete node type, e.g. `"Account"` or `"dateTime"`.
    fn type_name(&self) -> &'static str;

    /// Whether the node carries a value or at least one populated child.
    ///
    /// The element `id` is an attribute, not a child, and does not count.
    fn has_content(&self) -> bool;

    /// Structural hash over every declared field, computed once per instance.
    fn stable_hash(&self) -> u64;

    fn as_any(&self) -> &dyn Any;

    /// Lexical form of a primitive value; `None` for composite nodes.
    fn value_text(&self) -> Option<String> {
        None
    }
}

impl dyn Element + '_ {
    /// Downcast to a concrete node type.
    pub fn downcast_ref<T: Element>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Access to the extension content every node may carry.
pub trait Extensible {
    fn element_id(&self) -> Option<&str>;

    fn extension(&self) -> &[Extension];

    /// Extensions with the given definition url, in declaration order.
    fn extensions_by_url<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> + 'a {
        self.extension().iter().filter(move |ext| ext.url() == Some(url))
    }
}

/// Nodes carrying modifier extensions, which consumers MUST NOT ignore.
pub trait ModifierExtensible: Extensible {
    fn modifier_extension(&self) -> &[Extension];

    /// True when the node carries at least one modifier extension.
    fn is_modified(&self) -> bool {
        !self.modifier_extension().is_empty()
    }
}

/// Lazily computed, cached structural hash.
///
/// Ignored by equality and hashing of the owning node. Concurrent first
/// access is safe: the computation is pure, so every caller observes the same
/// value.
#[derive(Clone, Default)]
pub struct HashMemo(OnceLock<u64>);

impl HashMemo {
    pub fn new() -> Self {
        Self(OnceLock::new())
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        *self.0.get_or_init(compute)
    }

    pub fn is_computed(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for HashMemo {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for HashMemo {}

impl Hash for HashMemo {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Debug for HashMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(hash) => write!(f, "HashMemo({hash:#x})"),
            None => f.write_str("HashMemo(-)"),
        }
    }
}

/// Hash a tuple of field references with a deterministic hasher.
pub fn memo_hash<T: Hash + ?Sized>(fields: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    fields.hash(&mut hasher);
    hasher.finish()
}

/// Fields shared by every element: optional id and extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementCommon {
    pub(crate) id: Option<String>,
    pub(crate) extension: Vec<Extension>,
}

impl ElementCommon {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }

    pub fn has_content(&self) -> bool {
        !self.extension.is_empty()
    }

    /// Walk `id` then `extension`, the first declared fields of every element.
    pub fn accept_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        accept_attribute(&self.id, "id", visitor)?;
        accept_list(&self.extension, "extension", "Extension", visitor)
    }
}

/// Fields shared by backbone (sub-record) elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackboneCommon {
    pub(crate) element: ElementCommon,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl BackboneCommon {
    pub fn element(&self) -> &ElementCommon {
        &self.element
    }

    pub fn id(&self) -> Option<&str> {
        self.element.id()
    }

    pub fn extension(&self) -> &[Extension] {
        self.element.extension()
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }

    pub fn has_content(&self) -> bool {
        self.element.has_content() || !self.modifier_extension.is_empty()
    }

    pub fn accept_children<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        self.element.accept_children(visitor)?;
        accept_list(
            &self.modifier_extension,
            "modifierExtension",
            "Extension",
            visitor,
        )
    }
}
