//! The procedural (behavioral) tree of the netlist.

use crate::expr::NetExpr;
use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;

/// Whether a block's statements run sequentially or in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// `begin ... end`.
    Sequential,
    /// `fork ... join`.
    Parallel,
}

/// The matching flavor of a case statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseKind {
    /// Exact 4-state matching.
    Case,
    /// `x` and `z` bits are wildcards.
    Casex,
    /// `z` bits are wildcards.
    Casez,
}

/// One flattened case arm: a guard (or `None` for the default) and an
/// optional body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCaseItem {
    /// The guard expression; `None` marks the default arm.
    pub guard: Option<NetExpr>,
    /// The arm body; `None` for an empty arm.
    pub stmt: Option<NetProc>,
}

/// A behavioral statement in the netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NetProc {
    /// A statement block.
    Block {
        /// Sequential or parallel execution.
        kind: BlockKind,
        /// The contained statements in order.
        stmts: Vec<NetProc>,
    },
    /// An if/else statement. The condition is one bit wide.
    Condit {
        /// The condition expression.
        cond: NetExpr,
        /// The `if` branch.
        if_stmt: Option<Box<NetProc>>,
        /// The `else` branch.
        else_stmt: Option<Box<NetProc>>,
    },
    /// A case statement with flattened arms: each guard expression of the
    /// source gets its own item.
    Case {
        /// The matching flavor.
        kind: CaseKind,
        /// The scrutinee expression.
        expr: NetExpr,
        /// The flattened arms.
        items: Vec<NetCaseItem>,
    },
    /// A while loop.
    While {
        /// The loop condition.
        cond: NetExpr,
        /// The loop body.
        body: Box<NetProc>,
    },
    /// A repeat loop with a non-trivial count (counts 0 and 1 are folded
    /// away during elaboration).
    Repeat {
        /// The repetition count.
        count: NetExpr,
        /// The loop body.
        body: Box<NetProc>,
    },
    /// A forever loop.
    Forever {
        /// The loop body.
        body: Box<NetProc>,
    },
    /// A constant delay, optionally guarding a statement.
    PDelay {
        /// The delay in simulation ticks.
        delay: u64,
        /// The guarded statement, if any.
        stmt: Option<Box<NetProc>>,
    },
    /// An event wait bundling one or more event source nodes.
    PEvent {
        /// The event source nodes ([`NodeKind::Event`](crate::node::NodeKind)).
        sources: Vec<NodeId>,
        /// The guarded statement; `@(e) ;` has none.
        stmt: Option<Box<NetProc>>,
    },
    /// A procedural assignment; the node carries the pins, r-value, and
    /// delays.
    Assign(NodeId),
    /// A procedural assignment to a memory word.
    AssignMem(NodeId),
    /// A call to a user task, by fully qualified definition path.
    UTask(Ident),
    /// A call to a system task.
    STask {
        /// The `$`-prefixed task name.
        name: String,
        /// The argument expressions; positions may be empty.
        args: Vec<Option<NetExpr>>,
    },
}

impl NetProc {
    /// Creates an empty sequential block, the canonical no-op statement.
    pub fn empty_block() -> Self {
        NetProc::Block {
            kind: BlockKind::Sequential,
            stmts: Vec::new(),
        }
    }
}

/// Whether a process runs once or repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// An `initial` process.
    Initial,
    /// An `always` process.
    Always,
}

/// A top-level behavioral process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetProcTop {
    /// Initial or always.
    pub kind: ProcessKind,
    /// The process body.
    pub statement: NetProc,
    /// Source location.
    pub span: Span,
}
