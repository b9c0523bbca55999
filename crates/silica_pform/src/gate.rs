//! Parsed gate-level items: continuous assigns, primitive gates, and
//! module/UDP instantiations.

use crate::expr::PExpr;
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;
use std::collections::BTreeMap;

/// A built-in primitive gate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// AND gate.
    And,
    /// Non-inverting buffer.
    Buf,
    /// Tri-state buffer, enabled low.
    Bufif0,
    /// Tri-state buffer, enabled high.
    Bufif1,
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

/// A continuous assignment (`assign l = r;`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PGAssign {
    /// Delay expressions (zero to three).
    pub delays: Vec<PExpr>,
    /// The l-value net expression.
    pub lval: PExpr,
    /// The r-value expression.
    pub rval: PExpr,
    /// Source location.
    pub span: Span,
}

/// An instantiation of a built-in gate primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PGBuiltin {
    /// The gate function.
    pub kind: GateKind,
    /// The instance name, if given.
    pub name: Option<Ident>,
    /// The `[msb:lsb]` range producing a bank of gates, if given.
    pub range: Option<(PExpr, PExpr)>,
    /// Delay expressions (zero to three).
    pub delays: Vec<PExpr>,
    /// The pin expressions; pin 0 is the output.
    pub pins: Vec<PExpr>,
    /// Source-level attributes.
    pub attributes: BTreeMap<String, String>,
    /// Source location.
    pub span: Span,
}

/// Parameter overrides attached to an instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParamOverrides {
    /// Ordered `#(expr, expr, ...)` overrides.
    Positional(Vec<PExpr>),
    /// Named `#(.NAME(expr), ...)` overrides.
    Named(Vec<(Ident, PExpr)>),
}

/// A named port binding `.port(expr)`; the expression may be absent
/// (`.port()`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedPin {
    /// The formal port name.
    pub name: Ident,
    /// The bound expression, or `None` for an explicitly open port.
    pub expr: Option<PExpr>,
    /// Source location.
    pub span: Span,
}

/// The pin bindings of an instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PinBinding {
    /// Positional bindings; `None` entries are unconnected positions.
    Positional(Vec<Option<PExpr>>),
    /// Named bindings.
    Named(Vec<NamedPin>),
}

impl PinBinding {
    /// Returns the number of bindings given in the source.
    pub fn len(&self) -> usize {
        match self {
            PinBinding::Positional(pins) => pins.len(),
            PinBinding::Named(pins) => pins.len(),
        }
    }

    /// Returns `true` if no bindings were given.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An instantiation of a module or user-defined primitive by type name.
///
/// Which of the two it is cannot be known until elaboration looks the
/// type name up in the module and primitive tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PGInstance {
    /// The instantiated module or primitive type name.
    pub type_name: Ident,
    /// The instance name; required for modules, reported if missing.
    pub name: Option<Ident>,
    /// The `[msb:lsb]` instantiation-array range, if given (unsupported).
    pub range: Option<(PExpr, PExpr)>,
    /// Parameter overrides, if given.
    pub overrides: Option<ParamOverrides>,
    /// Port bindings.
    pub pins: PinBinding,
    /// Source-level attributes.
    pub attributes: BTreeMap<String, String>,
    /// Source location.
    pub span: Span,
}

/// A gate-level module item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PGate {
    /// A continuous assignment.
    Assign(PGAssign),
    /// A built-in primitive gate.
    Builtin(PGBuiltin),
    /// A module or UDP instantiation.
    Instance(PGInstance),
}

impl PGate {
    /// Returns the source location of this gate item.
    pub fn span(&self) -> Span {
        match self {
            PGate::Assign(g) => g.span,
            PGate::Builtin(g) => g.span,
            PGate::Instance(g) => g.span,
        }
    }
}
