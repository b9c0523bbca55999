//! Parsed wire, register, and memory declarations.

use crate::expr::PExpr;
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;
use std::collections::BTreeMap;

/// The declared kind of a wire-like object.
///
/// The parser records exactly what the source said; elaboration resolves
/// the implicit kinds (`Implicit` becomes a wire, `ImplicitReg` a reg).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireKind {
    /// A name used before any declaration; treated as a wire.
    Implicit,
    /// An explicit `wire`.
    Wire,
    /// A name implied to be a register (e.g. by a procedural assign).
    ImplicitReg,
    /// An explicit `reg`.
    Reg,
    /// An `integer` variable.
    Integer,
}

/// The port direction of a wire, if it backs a module port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Not a port.
    NotAPort,
    /// An `input` port.
    Input,
    /// An `output` port.
    Output,
    /// An `inout` port.
    Inout,
}

/// A declared wire, register, integer, or memory.
///
/// The parser merges the multiple declarations of one symbol (e.g.
/// `input a;` and `reg a;`) into a single `PWire`, accumulating every
/// declared `[msb:lsb]` range. Elaboration checks that all ranges agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PWire {
    /// The declared name.
    pub name: Ident,
    /// The declared kind.
    pub kind: WireKind,
    /// The port direction, or [`PortDirection::NotAPort`].
    pub port_direction: PortDirection,
    /// Every declared `[msb:lsb]` range for this symbol.
    pub ranges: Vec<(PExpr, PExpr)>,
    /// The `[left:right]` word-index bounds, if this is a memory.
    pub memory_range: Option<(PExpr, PExpr)>,
    /// Source-level attributes.
    pub attributes: BTreeMap<String, String>,
    /// Source location.
    pub span: Span,
}

impl PWire {
    /// Creates a scalar wire declaration with no ranges or attributes.
    pub fn scalar(name: Ident, kind: WireKind, port_direction: PortDirection, span: Span) -> Self {
        Self {
            name,
            kind,
            port_direction,
            ranges: Vec::new(),
            memory_range: None,
            attributes: BTreeMap::new(),
            span,
        }
    }

    /// Returns `true` if this declaration has memory word indices.
    pub fn is_memory(&self) -> bool {
        self.memory_range.is_some()
    }
}
