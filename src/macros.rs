//! Trait impls shared verbatim by every node type.
//!
//! Each node embeds its common fields as `common` and its cached hash as `memo`.

/// `Hash` for a node type, feeding the memoized structural hash.
macro_rules! impl_node_hash {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    state.write_u64($crate::domain::Element::stable_hash(self));
                }
            }
        )+
    };
}

/// `Extensible` through the embedded `common` fields.
macro_rules! impl_extensible {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::domain::Extensible for $ty {
                fn element_id(&self) -> Option<&str> {
                    self.common.id()
                }

                fn extension(&self) -> &[$crate::types::Extension] {
                    self.common.extension()
                }
            }
        )+
    };
}

/// `Extensible` plus `ModifierExtensible` for backbone elements and resources.
macro_rules! impl_modifier_extensible {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::macros::impl_extensible!($ty);

            impl $crate::domain::ModifierExtensible for $ty {
                fn modifier_extension(&self) -> &[$crate::types::Extension] {
                    self.common.modifier_extension()
                }
            }
        )+
    };
}

pub(crate) use impl_extensible;
pub(crate) use impl_modifier_extensible;
pub(crate) use impl_node_hash;
