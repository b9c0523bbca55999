//! The netlist intermediate representation produced by elaboration.
//!
//! A [`Design`] owns everything the elaborator creates: the scope tree,
//! signals, memories, structural nodes, behavioral processes, parameter
//! values, task and function definitions, and the pin connection graph.
//! Freeing the design frees them all; parse-tree nodes live in their own
//! arena and outlive elaboration.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod expr;
pub mod ids;
pub mod link;
pub mod memory;
pub mod net;
pub mod node;
pub mod proc;
pub mod scope;

pub use arena::{Arena, ArenaId};
pub use design::{Design, NetFuncDef, NetTaskDef};
pub use expr::{BinOp, CompOp, NetExpr, UnOp};
pub use ids::{MemoryId, NetId, NodeId, PinId, ProcId, ScopeId};
pub use link::{LinkGraph, PinOwner};
pub use memory::NetMemory;
pub use net::{NetKind, NetNet, PortClass};
pub use node::{EventEdge, LogicOp, NetNode, NodeKind};
pub use proc::{BlockKind, CaseKind, NetCaseItem, NetProc, NetProcTop, ProcessKind};
pub use scope::{NetScope, ScopeKind};
