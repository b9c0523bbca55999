//! Structural nodes: gates, constants, primitives, and pinned assignments.

use crate::expr::{CompOp, NetExpr};
use crate::ids::{MemoryId, NetId, PinId};
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Logic, LogicVec};
use silica_source::Span;
use std::collections::BTreeMap;

/// The logic function of a [`NodeKind::Logic`] node.
///
/// Pin 0 is the output; the remaining pins are inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    /// AND gate.
    And,
    /// Non-inverting buffer.
    Buf,
    /// Tri-state buffer, enabled low.
    Bufif0,
    /// Tri-state buffer, enabled high.
    Bufif1,
    /// The identity connection used for port and assign plumbing.
    Bufz,
    /// NAND gate.
    Nand,
    /// NOR gate.
    Nor,
    /// Inverter.
    Not,
    /// OR gate.
    Or,
    /// XNOR gate.
    Xnor,
    /// XOR gate.
    Xor,
}

/// The edge detected by an event source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventEdge {
    /// Rising edge of bit 0.
    Posedge,
    /// Falling edge of bit 0.
    Negedge,
    /// Any change of any connected bit.
    Anyedge,
    /// Level-sensitive wait.
    Level,
}

/// The kind-specific payload of a structural node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    /// A built-in logic gate. Pin 0 drives the output.
    Logic {
        /// The gate function.
        op: LogicOp,
        /// Rise delay in simulation ticks.
        rise: u64,
        /// Fall delay in simulation ticks.
        fall: u64,
        /// Decay delay in simulation ticks.
        decay: u64,
    },
    /// A user-defined primitive. Pin 0 drives the output.
    Udp {
        /// `true` for a stateful primitive.
        sequential: bool,
        /// Truth table: input-column string to output character. For
        /// sequential primitives the current state is the first input
        /// character.
        table: Vec<(String, char)>,
        /// The initial output state.
        initial: Logic,
    },
    /// A constant driver; one pin per bit of the value.
    Const {
        /// The driven value.
        value: LogicVec,
    },
    /// A procedural assignment target. The pins connect to the assigned
    /// register slice; the node also appears in the procedural tree.
    Assign {
        /// The assigned width.
        width: u32,
        /// The bit-select index for a non-constant single-bit target.
        mux: Option<NetExpr>,
        /// The r-value expression.
        rval: NetExpr,
        /// `true` for a non-blocking (`<=`) assignment.
        nonblocking: bool,
        /// Rise delay in simulation ticks.
        rise: u64,
        /// Fall delay in simulation ticks.
        fall: u64,
        /// Decay delay in simulation ticks.
        decay: u64,
    },
    /// A procedural assignment to a memory word. Carries no pins; the
    /// index is a lowered net.
    AssignMem {
        /// The target memory.
        mem: MemoryId,
        /// The net computing the word index.
        index: NetId,
        /// The r-value expression.
        rval: NetExpr,
        /// `true` for a non-blocking (`<=`) assignment.
        nonblocking: bool,
    },
    /// An event source feeding a `NetProc::PEvent`. The pins watch the
    /// lowered event expression.
    Event {
        /// The detected edge.
        edge: EventEdge,
    },
    /// An adder/subtractor.
    ///
    /// Pin layout: `[Result x width, DataA x width, DataB x width]`.
    AddSub {
        /// The operand and result width.
        width: u32,
        /// `true` for subtraction.
        sub: bool,
    },
    /// A magnitude/equality comparator producing one result bit.
    ///
    /// Pin layout: `[Result, DataA x width, DataB x width]`.
    Compare {
        /// The operand width.
        width: u32,
        /// The comparison performed.
        op: CompOp,
    },
    /// A two-input word multiplexer for ternary expressions.
    ///
    /// Pin layout: `[Result x width, Sel, DataA x width, DataB x width]`,
    /// where `DataA` is selected when `Sel` is 1.
    Mux {
        /// The word width.
        width: u32,
    },
    /// A combinational user-function call site.
    ///
    /// Pin layout: `[Result x return width, args in declaration order]`.
    UFunc {
        /// The fully qualified path of the called function.
        def: Ident,
    },
    /// A D flip-flop bank created by synthesis.
    ///
    /// Pin layout: `[Clock, Enable, Data x width, Q x width]`.
    Ff {
        /// The register width.
        width: u32,
    },
    /// A RAM write/read port created by synthesis.
    ///
    /// Pin layout: `[InClock, WE, Address x awidth, Data x width,
    /// Q x width]`.
    RamDq {
        /// The accessed memory.
        mem: MemoryId,
        /// The number of address lines.
        awidth: u32,
        /// The data width (the memory word width).
        width: u32,
    },
}

/// A structural node in the netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetNode {
    /// The node's scope-qualified symbol name.
    pub name: Ident,
    /// The node's pins, laid out per [`NodeKind`].
    pub pins: Vec<PinId>,
    /// Attributes attached to this node.
    pub attributes: BTreeMap<String, String>,
    /// The kind-specific payload.
    pub kind: NodeKind,
    /// Source location.
    pub span: Span,
}

impl NetNode {
    /// Returns the pin at `idx`.
    pub fn pin(&self, idx: u32) -> PinId {
        self.pins[idx as usize]
    }

    /// Returns the number of pins.
    pub fn pin_count(&self) -> u32 {
        self.pins.len() as u32
    }

    /// The clock pin of a flip-flop node.
    ///
    /// # Panics
    ///
    /// Panics unless this node is a [`NodeKind::Ff`].
    pub fn ff_clock(&self) -> PinId {
        assert!(matches!(self.kind, NodeKind::Ff { .. }));
        self.pins[0]
    }

    /// The clock-enable pin of a flip-flop node.
    pub fn ff_enable(&self) -> PinId {
        assert!(matches!(self.kind, NodeKind::Ff { .. }));
        self.pins[1]
    }

    /// The `Data[idx]` pin of a flip-flop node.
    pub fn ff_data(&self, idx: u32) -> PinId {
        match self.kind {
            NodeKind::Ff { width } => {
                assert!(idx < width);
                self.pins[(2 + idx) as usize]
            }
            _ => panic!("not a flip-flop node"),
        }
    }

    /// The `Q[idx]` pin of a flip-flop node.
    pub fn ff_q(&self, idx: u32) -> PinId {
        match self.kind {
            NodeKind::Ff { width } => {
                assert!(idx < width);
                self.pins[(2 + width + idx) as usize]
            }
            _ => panic!("not a flip-flop node"),
        }
    }

    /// The input-clock pin of a RAM port node.
    pub fn ram_inclock(&self) -> PinId {
        assert!(matches!(self.kind, NodeKind::RamDq { .. }));
        self.pins[0]
    }

    /// The write-enable pin of a RAM port node.
    pub fn ram_we(&self) -> PinId {
        assert!(matches!(self.kind, NodeKind::RamDq { .. }));
        self.pins[1]
    }

    /// The `Address[idx]` pin of a RAM port node.
    pub fn ram_address(&self, idx: u32) -> PinId {
        match self.kind {
            NodeKind::RamDq { awidth, .. } => {
                assert!(idx < awidth);
                self.pins[(2 + idx) as usize]
            }
            _ => panic!("not a RAM port node"),
        }
    }

    /// The `Data[idx]` pin of a RAM port node.
    pub fn ram_data(&self, idx: u32) -> PinId {
        match self.kind {
            NodeKind::RamDq { awidth, width, .. } => {
                assert!(idx < width);
                self.pins[(2 + awidth + idx) as usize]
            }
            _ => panic!("not a RAM port node"),
        }
    }

    /// The `Q[idx]` pin of a RAM port node.
    pub fn ram_q(&self, idx: u32) -> PinId {
        match self.kind {
            NodeKind::RamDq { awidth, width, .. } => {
                assert!(idx < width);
                self.pins[(2 + awidth + width + idx) as usize]
            }
            _ => panic!("not a RAM port node"),
        }
    }

    /// The number of pins a node of the given kind must allocate.
    pub fn pins_for(kind: &NodeKind, explicit: u32) -> u32 {
        match kind {
            NodeKind::Logic { .. }
            | NodeKind::Udp { .. }
            | NodeKind::Event { .. }
            | NodeKind::UFunc { .. } => explicit,
            NodeKind::Const { value } => value.width(),
            NodeKind::Assign { width, .. } => *width,
            NodeKind::AssignMem { .. } => 0,
            NodeKind::AddSub { width, .. } => 3 * width,
            NodeKind::Compare { width, .. } => 1 + 2 * width,
            NodeKind::Mux { width } => 1 + 3 * width,
            NodeKind::Ff { width } => 2 + 2 * width,
            NodeKind::RamDq { awidth, width, .. } => 2 + awidth + 2 * width,
        }
    }
}
