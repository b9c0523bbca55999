//! Synthesis of procedural r-value expressions into nets.
//!
//! The sequential patterns only accept r-values that are already nets in
//! disguise: signal references, constant slices, and constants. Anything
//! else makes the pattern matcher walk away and leave the process in
//! behavioral form.

use silica_common::{Interner, Logic};
use silica_netlist::{Design, NetExpr, NetId, NetKind, NodeKind, PortClass};
use silica_source::Span;

/// Synthesizes an expression into a net, returning `None` when the
/// expression has no direct structural form.
pub fn synthesize(design: &mut Design, interner: &Interner, expr: &NetExpr) -> Option<NetId> {
    match expr {
        NetExpr::Signal(net) => Some(*net),
        NetExpr::Part {
            signal,
            offset,
            width,
        } => {
            let holder = local_net(design, interner, *signal, *width);
            for i in 0..*width {
                let hp = design.signals[holder].pin(i);
                let sp = design.signals[*signal].pin(offset + i);
                design.links.connect(hp, sp);
            }
            Some(holder)
        }
        NetExpr::Const(value) => {
            let scope = design.root_scope()?;
            let path = design.scope_path(scope);
            let name = design.local_symbol(interner, path);
            let width = value.width();
            let node = design.add_node(
                name,
                NodeKind::Const {
                    value: value.clone(),
                },
                0,
                Span::DUMMY,
            );
            let holder_name = design.local_symbol(interner, path);
            let holder = design.add_signal(
                scope,
                holder_name,
                NetKind::Wire,
                PortClass::NotAPort,
                width.max(1) as i64 - 1,
                0,
                Logic::Z,
                true,
                Span::DUMMY,
            );
            for i in 0..width {
                let np = design.nodes[node].pin(i);
                let hp = design.signals[holder].pin(i);
                design.links.connect(np, hp);
            }
            Some(holder)
        }
        _ => None,
    }
}

fn local_net(design: &mut Design, interner: &Interner, like: NetId, width: u32) -> NetId {
    let scope = design.signals[like].scope;
    let path = design.scope_path(scope);
    let name = design.local_symbol(interner, path);
    design.add_signal(
        scope,
        name,
        NetKind::Wire,
        PortClass::NotAPort,
        width.max(1) as i64 - 1,
        0,
        Logic::Z,
        true,
        Span::DUMMY,
    )
}
