//! Wire elaboration: parse-tree declarations become signals and memories.

use silica_common::Logic;
use silica_netlist::{MemoryId, NetId, NetKind, NetMemory, PortClass, ScopeId};
use silica_pform::{PortDirection, PWire, WireKind};

use crate::const_eval::eval_const_long;
use crate::context::ElabCtx;
use crate::errors;

/// The elaborated form of one declaration.
pub enum ElaboratedWire {
    /// The declaration became a signal.
    Signal(NetId),
    /// The declaration became a memory.
    Memory(MemoryId),
    /// The declaration was dropped after an error.
    Failed,
}

/// Elaborates a declared wire into the given scope.
///
/// Resolves the implicit kinds, constant-evaluates every declared range
/// (all must agree by value), and creates either a memory (when word
/// indices are present) or a signal with one pin per bit. Register-like
/// signals start as all-`x`, wires as all-`z`.
pub fn elaborate_wire(ctx: &mut ElabCtx, scope: ScopeId, wire: &PWire) -> ElaboratedWire {
    let path = ctx.design.scope_path(scope);
    let kind = match wire.kind {
        WireKind::Implicit | WireKind::Wire => NetKind::Wire,
        WireKind::ImplicitReg | WireKind::Reg => NetKind::Reg,
        WireKind::Integer => NetKind::Integer,
    };

    let (mut msb, mut lsb) = default_bounds(kind);
    if !wire.ranges.is_empty() {
        let mut bounds = Vec::with_capacity(wire.ranges.len());
        for (m_expr, l_expr) in &wire.ranges {
            let Some(m) = eval_const_long(ctx, path, m_expr) else {
                ctx.emit(errors::error_not_constant(
                    "a range bound",
                    m_expr.span(),
                ));
                return ElaboratedWire::Failed;
            };
            let Some(l) = eval_const_long(ctx, path, l_expr) else {
                ctx.emit(errors::error_not_constant(
                    "a range bound",
                    l_expr.span(),
                ));
                return ElaboratedWire::Failed;
            };
            bounds.push((m, l));
        }
        for &(m, l) in &bounds[1..] {
            if (m, l) != bounds[0] {
                ctx.emit(errors::error_inconsistent_width(
                    ctx.interner.resolve(wire.name),
                    (m, l),
                    bounds[0],
                    wire.span,
                ));
                return ElaboratedWire::Failed;
            }
        }
        (msb, lsb) = bounds[0];
    }

    let name = ctx.interner.join(path, ctx.interner.resolve(wire.name));

    if let Some((l_expr, r_expr)) = &wire.memory_range {
        let width = (msb - lsb).unsigned_abs() as u32 + 1;
        let Some(left) = eval_const_long(ctx, path, l_expr) else {
            ctx.emit(errors::error_not_constant("a memory index", l_expr.span()));
            return ElaboratedWire::Failed;
        };
        let Some(right) = eval_const_long(ctx, path, r_expr) else {
            ctx.emit(errors::error_not_constant("a memory index", r_expr.span()));
            return ElaboratedWire::Failed;
        };
        let id = ctx.design.add_memory(NetMemory {
            name,
            width,
            left_idx: left,
            right_idx: right,
            span: wire.span,
        });
        return ElaboratedWire::Memory(id);
    }

    let init = if kind.is_reg_like() { Logic::X } else { Logic::Z };
    let id = ctx.design.add_signal(
        scope,
        name,
        kind,
        port_class(wire.port_direction),
        msb,
        lsb,
        init,
        false,
        wire.span,
    );
    ctx.design.signals[id].attributes = wire.attributes.clone();
    ElaboratedWire::Signal(id)
}

/// Maps a parse-tree port direction to the netlist port class.
pub fn port_class(dir: PortDirection) -> PortClass {
    match dir {
        PortDirection::NotAPort => PortClass::NotAPort,
        PortDirection::Input => PortClass::Input,
        PortDirection::Output => PortClass::Output,
        PortDirection::Inout => PortClass::Inout,
    }
}

/// Integers are 32 bits wide unless a range says otherwise; everything
/// else defaults to a scalar.
fn default_bounds(kind: NetKind) -> (i64, i64) {
    match kind {
        NetKind::Integer => (31, 0),
        _ => (0, 0),
    }
}
