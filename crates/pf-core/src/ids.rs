//! Strongly typed identifier wrappers.
//!
//! Two kinds of node identity exist side by side:
//!
//! - [`NodeKey`] is the *external* identifier a node carries in its source
//!   data (an OSM node id, a CSV key).  It is stable across graph fetches, so
//!   selections made against one graph can be checked against the next.
//! - [`NodeId`] is the *dense* index a graph assigns while building.  It is
//!   only meaningful for the graph that issued it and is what the search
//!   engine indexes its scratch table with.

use std::fmt;

/// Dense `u32` index newtype with an all-ones "unset" value.
///
/// `Display` renders `n7` / `e3` style labels (`n?` when unset), short
/// enough for structured log fields.
macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident, $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for "not set"; never issued by a graph.
            pub const INVALID: $name = $name(u32::MAX);

            /// Id for a `Vec` position, or `None` if it does not fit in `u32`
            /// (or would collide with `INVALID`).
            pub fn from_index(index: usize) -> Option<$name> {
                u32::try_from(index).ok().filter(|&raw| raw != u32::MAX).map($name)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($label, "{}"), self.0)
                } else {
                    f.write_str(concat!($label, "?"))
                }
            }
        }
    };
}

typed_id! {
    /// Dense index of a node inside one graph.
    NodeId, "n"
}

typed_id! {
    /// Dense index of a directed edge inside one graph.
    EdgeId, "e"
}

/// External node identifier as supplied by the graph source.
///
/// OSM ids are signed 64-bit, so that is the width used here.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeKey(pub i64);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for NodeKey {
    #[inline]
    fn from(raw: i64) -> Self {
        NodeKey(raw)
    }
}
