//! Opaque ID newtypes for all netlist entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`. IDs are created by
//! [`Arena::alloc`](crate::arena::Arena::alloc) (or the link graph for
//! [`PinId`]) and used for O(1) lookup.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a scope in the design hierarchy.
    ScopeId
);

define_id!(
    /// Opaque, copyable ID for a signal.
    NetId
);

define_id!(
    /// Opaque, copyable ID for a memory.
    MemoryId
);

define_id!(
    /// Opaque, copyable ID for a structural node.
    NodeId
);

define_id!(
    /// Opaque, copyable ID for a behavioral process.
    ProcId
);

define_id!(
    /// Opaque, copyable ID for a pin in the connection graph.
    PinId
);
