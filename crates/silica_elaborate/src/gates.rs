//! Gate-level elaboration: continuous assigns, primitive gates, and
//! module/UDP instantiation.

use silica_common::Logic;
use silica_netlist::{LogicOp, NetId, NodeKind, ScopeId, ScopeKind};
use silica_pform::{
    GateKind, Module, PGAssign, PGBuiltin, PGInstance, PGate, PinBinding, PUdp,
};

use crate::const_eval::{eval_const_long, eval_delays};
use crate::context::ElabCtx;
use crate::errors;
use crate::expr_net::{elaborate_lnet, elaborate_net};
use crate::module::elaborate_module;

/// Elaborates one gate-level item.
pub fn elaborate_gate(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGate) {
    match gate {
        PGate::Assign(g) => elaborate_cassign(ctx, scope, g),
        PGate::Builtin(g) => elaborate_builtin(ctx, scope, g),
        PGate::Instance(g) => elaborate_instance(ctx, scope, g),
    }
}

/// Elaborates a continuous assignment by connecting the l-value net to
/// the r-value net pin by pin. The delays ride on the r-value's final
/// driving gate.
fn elaborate_cassign(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGAssign) {
    let path = ctx.design.scope_path(scope);
    let (rise, fall, decay) = eval_delays(ctx, path, &gate.delays);

    let Some(lval) = elaborate_lnet(ctx, scope, &gate.lval) else {
        return;
    };
    let lwidth = ctx.design.signals[lval].width();

    let Some(rval) = elaborate_net(ctx, scope, &gate.rval, lwidth, rise, fall, decay) else {
        ctx.emit(errors::error_cannot_elaborate("r-value", gate.span));
        return;
    };
    let rwidth = ctx.design.signals[rval].width();

    if lwidth > rwidth {
        ctx.emit(errors::sorry_lval_wider(lwidth, rwidth, gate.span));
        return;
    }

    for idx in 0..lwidth {
        let lp = ctx.design.signals[lval].pin(idx);
        let rp = ctx.design.signals[rval].pin(idx);
        ctx.design.links.connect(lp, rp);
    }
}

fn logic_op(kind: GateKind) -> LogicOp {
    match kind {
        GateKind::And => LogicOp::And,
        GateKind::Buf => LogicOp::Buf,
        GateKind::Bufif0 => LogicOp::Bufif0,
        GateKind::Bufif1 => LogicOp::Bufif1,
        GateKind::Nand => LogicOp::Nand,
        GateKind::Nor => LogicOp::Nor,
        GateKind::Not => LogicOp::Not,
        GateKind::Or => LogicOp::Or,
        GateKind::Xnor => LogicOp::Xnor,
        GateKind::Xor => LogicOp::Xor,
    }
}

/// Elaborates a built-in gate, expanding a `[msb:lsb]` range after the
/// gate name into a bank of instances.
fn elaborate_builtin(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGBuiltin) {
    let path = ctx.design.scope_path(scope);

    let mut count: u32 = 1;
    let mut low: i64 = 0;
    let mut high: i64 = 0;
    if let Some((msb_expr, lsb_expr)) = &gate.range {
        let Some(msb) = eval_const_long(ctx, path, msb_expr) else {
            ctx.emit(errors::error_not_constant("a gate range", msb_expr.span()));
            return;
        };
        let Some(lsb) = eval_const_long(ctx, path, lsb_expr) else {
            ctx.emit(errors::error_not_constant("a gate range", lsb_expr.span()));
            return;
        };
        count = (msb - lsb).unsigned_abs() as u32 + 1;
        low = lsb;
        high = msb;
    }

    let base = match gate.name {
        Some(name) => ctx.interner.join(path, ctx.name(name)),
        None => ctx.design.local_symbol(ctx.interner, path),
    };

    let (rise, fall, decay) = eval_delays(ctx, path, &gate.delays);
    let op = logic_op(gate.kind);
    let pin_count = gate.pins.len() as u32;

    // One instance per bank index, each with its own <index> suffix; the
    // index walks from lsb toward msb when msb >= lsb, else downward.
    let mut bank = Vec::with_capacity(count as usize);
    for idx in 0..count {
        let index = if low < high {
            low + idx as i64
        } else {
            low - idx as i64
        };
        let inm = ctx
            .interner
            .get_or_intern(&format!("{}<{}>", ctx.name(base), index));
        let node = ctx.design.add_node(
            inm,
            NodeKind::Logic {
                op,
                rise,
                fall,
                decay,
            },
            pin_count,
            gate.span,
        );
        ctx.design.nodes[node].attributes = gate.attributes.clone();
        bank.push(node);
    }

    // Wire each pin position: a 1-bit net fans out to every instance, a
    // count-wide net distributes one bit per instance.
    for (idx, expr) in gate.pins.iter().enumerate() {
        let Some(sig) = elaborate_net(ctx, scope, expr, 0, 0, 0, 0) else {
            continue;
        };
        let sig_width = ctx.design.signals[sig].width();
        if sig_width == 1 {
            for &node in &bank {
                let np = ctx.design.nodes[node].pin(idx as u32);
                let sp = ctx.design.signals[sig].pin(0);
                ctx.design.links.connect(np, sp);
            }
        } else if sig_width == count {
            for (gdx, &node) in bank.iter().enumerate() {
                let np = ctx.design.nodes[node].pin(idx as u32);
                let sp = ctx.design.signals[sig].pin(gdx as u32);
                ctx.design.links.connect(np, sp);
            }
        } else {
            ctx.emit(errors::error_gate_count_mismatch(
                count,
                sig_width,
                idx as u32,
                gate.span,
            ));
        }
    }
}

/// Dispatches an instantiation to module or primitive elaboration.
fn elaborate_instance(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGInstance) {
    if let Some(module) = ctx.modules.get(&gate.type_name) {
        elaborate_mod(ctx, scope, gate, module);
        return;
    }
    if let Some(udp) = ctx.primitives.get(&gate.type_name) {
        elaborate_udp(ctx, scope, gate, udp);
        return;
    }
    ctx.emit(errors::error_unknown_module(
        ctx.name(gate.type_name),
        gate.span,
    ));
}

/// Recursively elaborates a module instance and splices its ports to the
/// instantiation expressions.
fn elaborate_mod(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGInstance, rmod: &Module) {
    let Some(iname) = gate.name else {
        ctx.emit(errors::error_missing_instance_name(
            ctx.name(gate.type_name),
            gate.span,
        ));
        return;
    };
    if gate.range.is_some() {
        ctx.emit(errors::sorry_instance_array(gate.span));
        return;
    }

    let leaf = ctx.name(iname).to_string();
    let Some(my_scope) = ctx
        .design
        .make_scope(ctx.interner, scope, ScopeKind::Module, &leaf)
    else {
        ctx.emit(errors::error_duplicate_scope(&leaf, gate.span));
        return;
    };

    // Reorder named bindings into port positions; positional bindings are
    // used as-is after an arity check.
    let nexp = rmod.port_count();
    let pins: Vec<Option<&silica_pform::PExpr>> = match &gate.pins {
        PinBinding::Named(named) => {
            let mut exp: Vec<Option<&silica_pform::PExpr>> = vec![None; nexp];
            let mut bound = vec![false; nexp];
            for np in named {
                let Some(pidx) = rmod.find_port(np.name) else {
                    ctx.emit(errors::error_not_a_port(
                        ctx.name(np.name),
                        ctx.name(iname),
                        np.span,
                    ));
                    continue;
                };
                if bound[pidx] {
                    ctx.emit(errors::error_port_bound_twice(ctx.name(np.name), np.span));
                    continue;
                }
                bound[pidx] = true;
                exp[pidx] = np.expr.as_ref();
            }
            exp
        }
        PinBinding::Positional(pos) => {
            if pos.len() != nexp {
                ctx.emit(errors::error_wrong_port_count(nexp, pos.len(), gate.span));
                return;
            }
            pos.iter().map(Option::as_ref).collect()
        }
    };

    elaborate_module(ctx, rmod, my_scope, gate.overrides.as_ref());

    let child_path = ctx.design.scope_path(my_scope);
    for (idx, pin) in pins.iter().enumerate() {
        let Some(expr) = pin else {
            continue;
        };

        // The port is one or more signals inside the child scope.
        let mut prts: Vec<NetId> = Vec::new();
        let mut missing = false;
        for wire in rmod.get_port(idx) {
            let pleaf = ctx.name(*wire).to_string();
            match ctx.design.find_signal(ctx.interner, child_path, &pleaf) {
                Some(id) => prts.push(id),
                None => {
                    ctx.emit(errors::internal_missing_signal(&pleaf, gate.span));
                    missing = true;
                }
            }
        }
        if missing {
            continue;
        }
        let mut prts_pin_count: u32 = prts.iter().map(|&p| ctx.design.signals[p].width()).sum();

        let Some(sig) = elaborate_net(ctx, scope, expr, prts_pin_count, 0, 0, 0) else {
            ctx.emit(errors::internal_expression_too_complicated(expr.span()));
            continue;
        };
        let sig_width = ctx.design.signals[sig].width();
        if sig_width != prts_pin_count {
            ctx.emit(errors::error_port_width(
                idx,
                ctx.name(gate.type_name),
                prts_pin_count,
                sig_width,
                gate.span,
            ));
            continue;
        }

        // Splice most-significant-first: the outer net's pins are taken
        // from the top down while each port signal is walked from its own
        // most significant bit.
        for &prt in &prts {
            let width = ctx.design.signals[prt].width();
            for p in 0..width {
                prts_pin_count -= 1;
                let op = ctx.design.signals[sig].pin(prts_pin_count);
                let ip = ctx.design.signals[prt].pin(width - p - 1);
                ctx.design.links.connect(op, ip);
            }
        }
    }
}

/// Instantiates a user-defined primitive.
fn elaborate_udp(ctx: &mut ElabCtx, scope: ScopeId, gate: &PGInstance, udp: &PUdp) {
    let path = ctx.design.scope_path(scope);
    let Some(iname) = gate.name else {
        ctx.emit(errors::error_missing_instance_name(
            ctx.name(gate.type_name),
            gate.span,
        ));
        return;
    };
    let name = ctx.interner.join(path, ctx.name(iname));

    // For sequential primitives each row's input string is prefixed with
    // the current-state character; duplicate rows keep the first entry.
    let mut table: Vec<(String, char)> = Vec::with_capacity(udp.rows.len());
    for row in &udp.rows {
        let input = if udp.sequential {
            format!("{}{}", row.current.unwrap_or('x'), row.inputs)
        } else {
            row.inputs.clone()
        };
        if table.iter().any(|(i, _)| *i == input) {
            continue;
        }
        table.push((input, row.output));
    }

    let initial = if udp.sequential {
        match udp.initial {
            Logic::Zero => Logic::Zero,
            Logic::One => Logic::One,
            _ => Logic::X,
        }
    } else {
        Logic::X
    };

    let node = ctx.design.add_node(
        name,
        NodeKind::Udp {
            sequential: udp.sequential,
            table,
            initial,
        },
        udp.port_count() as u32,
        gate.span,
    );
    ctx.design.nodes[node].attributes = udp.attributes.clone();

    let PinBinding::Positional(pins) = &gate.pins else {
        ctx.emit(errors::error_cannot_elaborate(
            "named port bindings on a primitive",
            gate.span,
        ));
        return;
    };
    for (idx, pin) in pins.iter().enumerate() {
        let Some(expr) = pin else {
            continue;
        };
        let Some(sig) = elaborate_net(ctx, scope, expr, 1, 0, 0, 0) else {
            ctx.emit(errors::internal_expression_too_complicated(expr.span()));
            continue;
        };
        let np = ctx.design.nodes[node].pin(idx as u32);
        let sp = ctx.design.signals[sig].pin(0);
        ctx.design.links.connect(np, sp);
    }
}
