//! Signals in the elaborated design.

use crate::ids::{PinId, ScopeId};
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Logic};
use silica_source::Span;
use std::collections::BTreeMap;

/// The storage kind of a signal after elaboration.
///
/// The parse tree's implicit kinds are resolved before a `NetNet` is
/// created, so only the three concrete kinds remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetKind {
    /// A continuously driven net.
    Wire,
    /// A procedurally assigned register.
    Reg,
    /// An `integer` variable (register semantics, 32 bits).
    Integer,
}

impl NetKind {
    /// Returns `true` for the kinds a procedural assign may target.
    pub fn is_reg_like(self) -> bool {
        matches!(self, NetKind::Reg | NetKind::Integer)
    }
}

/// The port class of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortClass {
    /// Not a port.
    NotAPort,
    /// An input port.
    Input,
    /// An output port.
    Output,
    /// A bidirectional port.
    Inout,
}

/// A signal: one pin per bit, plus naming and typing metadata.
///
/// The `local` flag marks compiler-synthesized temporaries (concatenation
/// holders, expression results) that a dead-code pass may remove if they
/// end up driving nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetNet {
    /// The fully qualified name.
    pub name: Ident,
    /// The scope this signal belongs to.
    pub scope: ScopeId,
    /// The storage kind.
    pub kind: NetKind,
    /// The port class.
    pub port: PortClass,
    /// The declared most-significant bit number.
    pub msb: i64,
    /// The declared least-significant bit number.
    pub lsb: i64,
    /// One pin per bit; index 0 is the least significant.
    pub pins: Vec<PinId>,
    /// The initial value of each bit (`x` for registers, `z` for wires).
    pub init: Vec<Logic>,
    /// Attributes attached to the declaration.
    pub attributes: BTreeMap<String, String>,
    /// Marks a compiler-synthesized temporary.
    pub local: bool,
    /// Source location of the declaration.
    pub span: Span,
}

impl NetNet {
    /// Returns the bit width of this signal.
    pub fn width(&self) -> u32 {
        self.pins.len() as u32
    }

    /// Returns the pin for bit `idx` (0 = least significant).
    pub fn pin(&self, idx: u32) -> PinId {
        self.pins[idx as usize]
    }

    /// Maps a source bit number (in `[msb:lsb]` space) to a pin index.
    ///
    /// Honors the declared direction: for `[7:0]` bit 7 is pin 7, while
    /// for `[0:7]` bit 0 is pin 7.
    pub fn sb_to_idx(&self, sb: i64) -> u32 {
        if self.msb >= self.lsb {
            (sb - self.lsb) as u32
        } else {
            (self.lsb - sb) as u32
        }
    }
}
