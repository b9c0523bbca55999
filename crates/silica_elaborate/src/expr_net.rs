//! Lowering of parse expressions to structural nets.
//!
//! An expression in a structural position (continuous assign r-value,
//! gate pin, port binding) becomes a [`NetNet`](silica_netlist::NetNet):
//! gates and arithmetic nodes are synthesized and a signal is returned
//! whose pins carry the result. Compiler-introduced holder signals are
//! flagged local so a dead-code pass may drop them when unused.

use silica_common::{Ident, Logic, LogicVec};
use silica_netlist::{CompOp, LogicOp, NetId, NetKind, NodeKind, PortClass, ScopeId};
use silica_pform::{BinaryOp, PExpr, UnaryOp};
use silica_source::Span;

use crate::const_eval::{eval_const_long, string_to_vec};
use crate::context::ElabCtx;
use crate::errors;
use crate::expr::find_parameter_fq;

/// Lowers a parse expression to a net of `width_hint` bits (0 lets the
/// expression pick its own width). The delay triple is attached to the
/// final driving gate.
pub fn elaborate_net(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    expr: &PExpr,
    width_hint: u32,
    rise: u64,
    fall: u64,
    decay: u64,
) -> Option<NetId> {
    match expr {
        PExpr::Number { value, span } => {
            let value = sized(value.clone(), width_hint);
            Some(const_net(ctx, scope, value, *span))
        }
        PExpr::String { value, span } => {
            let value = sized(string_to_vec(value), width_hint);
            Some(const_net(ctx, scope, value, *span))
        }
        PExpr::Ident { .. } => elaborate_net_ident(ctx, scope, expr, rise, fall, decay),
        PExpr::Unary { op, operand, span } => {
            elaborate_net_unary(ctx, scope, *op, operand, *span, rise, fall, decay)
        }
        PExpr::Binary {
            op,
            left,
            right,
            span,
        } => elaborate_net_binary(ctx, scope, *op, left, right, *span, rise, fall, decay),
        PExpr::Ternary {
            cond,
            then_expr,
            else_expr,
            span,
        } => elaborate_net_ternary(ctx, scope, cond, then_expr, else_expr, *span),
        PExpr::Concat {
            parts,
            repeat,
            span,
        } => elaborate_net_concat(ctx, scope, parts, repeat.as_deref(), *span),
        PExpr::FuncCall { name, args, span } => {
            elaborate_net_call(ctx, scope, *name, args, *span)
        }
    }
}

/// Lowers a parse expression as a structural l-value net.
///
/// Only identifiers (with constant selects) and non-repeat
/// concatenations of l-value nets are accepted.
pub fn elaborate_lnet(ctx: &mut ElabCtx, scope: ScopeId, expr: &PExpr) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    match expr {
        PExpr::Ident {
            name, msb, lsb, ..
        } => {
            let leaf = ctx.name(*name).to_string();
            let Some(signal) = ctx.design.find_signal(ctx.interner, path, &leaf) else {
                ctx.emit(errors::error_unknown_signal(
                    &leaf,
                    ctx.name(path),
                    expr.span(),
                ));
                return None;
            };
            match (msb.as_deref(), lsb.as_deref()) {
                (None, None) => Some(signal),
                (Some(m), Some(l)) => {
                    let slice = const_slice(ctx, path, signal, m, Some(l), expr.span())?;
                    Some(slice)
                }
                (Some(m), None) => {
                    if eval_const_long(ctx, path, m).is_none() {
                        ctx.emit(errors::sorry_structural_op(
                            "a non-constant bit select",
                            expr.span(),
                        ));
                        return None;
                    }
                    let slice = const_slice(ctx, path, signal, m, None, expr.span())?;
                    Some(slice)
                }
                (None, Some(_)) => {
                    ctx.emit(errors::internal_unreachable(
                        "part select with only a low bound",
                        expr.span(),
                    ));
                    None
                }
            }
        }
        PExpr::Concat {
            parts,
            repeat,
            span,
        } => {
            if repeat.is_some() {
                ctx.emit(errors::sorry_repeat_lnet(*span));
                return None;
            }
            let mut nets = Vec::with_capacity(parts.len());
            let mut failed = false;
            for part in parts {
                match elaborate_lnet(ctx, scope, part) {
                    Some(n) => nets.push(n),
                    None => failed = true,
                }
            }
            if failed {
                return None;
            }
            let total: u32 = nets.iter().map(|&n| ctx.design.signals[n].width()).sum();
            let holder = local_signal(ctx, scope, total, *span);
            // least significant operand is the last in textual order
            let mut at = 0;
            for &net in nets.iter().rev() {
                for bit in 0..ctx.design.signals[net].width() {
                    let hp = ctx.design.signals[holder].pin(at);
                    let np = ctx.design.signals[net].pin(bit);
                    ctx.design.links.connect(hp, np);
                    at += 1;
                }
            }
            Some(holder)
        }
        _ => {
            ctx.emit(errors::error_cannot_elaborate(
                "this expression as an l-value net",
                expr.span(),
            ));
            None
        }
    }
}

/// Creates an anonymous local holder signal of the given width.
pub fn local_signal(ctx: &mut ElabCtx, scope: ScopeId, width: u32, span: Span) -> NetId {
    let path = ctx.design.scope_path(scope);
    let name = ctx.design.local_symbol(ctx.interner, path);
    ctx.design.add_signal(
        scope,
        name,
        NetKind::Wire,
        PortClass::NotAPort,
        width.max(1) as i64 - 1,
        0,
        Logic::Z,
        true,
        span,
    )
}

fn sized(value: LogicVec, width_hint: u32) -> LogicVec {
    if width_hint > 0 && value.width() < width_hint {
        value.pad_to(width_hint)
    } else {
        value
    }
}

fn const_net(ctx: &mut ElabCtx, scope: ScopeId, value: LogicVec, span: Span) -> NetId {
    let path = ctx.design.scope_path(scope);
    let name = ctx.design.local_symbol(ctx.interner, path);
    let width = value.width();
    let node = ctx
        .design
        .add_node(name, NodeKind::Const { value }, 0, span);
    let holder = local_signal(ctx, scope, width, span);
    for bit in 0..width {
        let np = ctx.design.nodes[node].pin(bit);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(np, hp);
    }
    holder
}

fn elaborate_net_ident(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    expr: &PExpr,
    rise: u64,
    fall: u64,
    decay: u64,
) -> Option<NetId> {
    let PExpr::Ident {
        name, msb, lsb, span,
    } = expr
    else {
        unreachable!();
    };
    let path = ctx.design.scope_path(scope);
    let leaf = ctx.name(*name).to_string();

    // A name resolving to a parameter synthesizes a constant driver.
    if msb.is_none() && lsb.is_none() {
        if let Some(fq) = find_parameter_fq(ctx, path, &leaf) {
            let value = ctx.design.parameters[&fq].clone().eval_tree(&ctx.design);
            let Some(value) = value else {
                ctx.emit(errors::error_param_not_const(&leaf, *span));
                return None;
            };
            return Some(const_net(ctx, scope, value, *span));
        }
    }

    // A memory reference with an index is a structural read port.
    if let (Some(index), None) = (msb.as_deref(), lsb.as_deref()) {
        if let Some(mem) = ctx.design.find_memory(ctx.interner, path, &leaf) {
            return elaborate_net_memory_read(ctx, scope, mem, index, *span);
        }
    }

    let Some(signal) = ctx.design.find_signal(ctx.interner, path, &leaf) else {
        ctx.emit(errors::error_unknown_signal(&leaf, ctx.name(path), *span));
        return None;
    };

    let net = match (msb.as_deref(), lsb.as_deref()) {
        (None, None) => signal,
        (Some(m), Some(l)) => const_slice(ctx, path, signal, m, Some(l), *span)?,
        (Some(m), None) => {
            if eval_const_long(ctx, path, m).is_none() {
                ctx.emit(errors::sorry_structural_op(
                    "a non-constant bit select",
                    *span,
                ));
                return None;
            }
            const_slice(ctx, path, signal, m, None, *span)?
        }
        (None, Some(_)) => {
            ctx.emit(errors::internal_unreachable(
                "part select with only a low bound",
                *span,
            ));
            return None;
        }
    };

    if rise == 0 && fall == 0 && decay == 0 {
        return Some(net);
    }

    // Delays on a bare reference need a gate to live on.
    let width = ctx.design.signals[net].width();
    let holder = local_signal(ctx, scope, width, *span);
    for bit in 0..width {
        let gname = ctx.design.local_symbol(ctx.interner, path);
        let gate = ctx.design.add_node(
            gname,
            NodeKind::Logic {
                op: LogicOp::Bufz,
                rise,
                fall,
                decay,
            },
            2,
            *span,
        );
        let out = ctx.design.nodes[gate].pin(0);
        let inp = ctx.design.nodes[gate].pin(1);
        let hp = ctx.design.signals[holder].pin(bit);
        let np = ctx.design.signals[net].pin(bit);
        ctx.design.links.connect(out, hp);
        ctx.design.links.connect(inp, np);
    }
    Some(holder)
}

/// Builds a local holder connected to a constant bit or part select.
fn const_slice(
    ctx: &mut ElabCtx,
    path: Ident,
    signal: NetId,
    msb: &PExpr,
    lsb: Option<&PExpr>,
    span: Span,
) -> Option<NetId> {
    let Some(mv) = eval_const_long(ctx, path, msb) else {
        ctx.emit(errors::error_not_constant("a select bound", msb.span()));
        return None;
    };
    let lv = match lsb {
        Some(l) => {
            let Some(v) = eval_const_long(ctx, path, l) else {
                ctx.emit(errors::error_not_constant("a select bound", l.span()));
                return None;
            };
            v
        }
        None => mv,
    };
    let sig = &ctx.design.signals[signal];
    let a = sig.sb_to_idx(mv);
    let b = sig.sb_to_idx(lv);
    let (lo, hi) = (a.min(b), a.max(b));
    if hi >= sig.width() {
        ctx.emit(errors::error_cannot_elaborate(
            "a select outside the signal",
            span,
        ));
        return None;
    }
    let scope = sig.scope;
    let holder = local_signal(ctx, scope, hi - lo + 1, span);
    for (i, bit) in (lo..=hi).enumerate() {
        let hp = ctx.design.signals[holder].pin(i as u32);
        let sp = ctx.design.signals[signal].pin(bit);
        ctx.design.links.connect(hp, sp);
    }
    Some(holder)
}

fn elaborate_net_memory_read(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    mem: silica_netlist::MemoryId,
    index: &PExpr,
    span: Span,
) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    let addr = elaborate_net(ctx, scope, index, 0, 0, 0, 0)?;
    let awidth = ctx.design.signals[addr].width();
    let width = ctx.design.memories[mem].width;
    let name = ctx.design.local_symbol(ctx.interner, path);
    let ram = ctx.design.add_node(
        name,
        NodeKind::RamDq {
            mem,
            awidth,
            width,
        },
        0,
        span,
    );
    for bit in 0..awidth {
        let ap = ctx.design.nodes[ram].ram_address(bit);
        let sp = ctx.design.signals[addr].pin(bit);
        ctx.design.links.connect(ap, sp);
    }
    let holder = local_signal(ctx, scope, width, span);
    for bit in 0..width {
        let qp = ctx.design.nodes[ram].ram_q(bit);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(qp, hp);
    }
    Some(holder)
}

/// Widens `net` to `width` bits by pinning zeros above it.
fn pad_net(ctx: &mut ElabCtx, scope: ScopeId, net: NetId, width: u32, span: Span) -> NetId {
    let have = ctx.design.signals[net].width();
    if have >= width {
        return net;
    }
    let holder = local_signal(ctx, scope, width, span);
    for bit in 0..have {
        let hp = ctx.design.signals[holder].pin(bit);
        let np = ctx.design.signals[net].pin(bit);
        ctx.design.links.connect(hp, np);
    }
    let zeros = const_net(ctx, scope, LogicVec::new(width - have), span);
    for bit in have..width {
        let hp = ctx.design.signals[holder].pin(bit);
        let zp = ctx.design.signals[zeros].pin(bit - have);
        ctx.design.links.connect(hp, zp);
    }
    holder
}

/// Reduces `net` to a single truth bit with a wide OR gate; 1-bit nets
/// pass through.
fn reduce_truth(ctx: &mut ElabCtx, scope: ScopeId, net: NetId, span: Span) -> NetId {
    let width = ctx.design.signals[net].width();
    if width == 1 {
        return net;
    }
    reduction_gate(ctx, scope, LogicOp::Or, net, span)
}

fn reduction_gate(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    op: LogicOp,
    net: NetId,
    span: Span,
) -> NetId {
    let path = ctx.design.scope_path(scope);
    let width = ctx.design.signals[net].width();
    let name = ctx.design.local_symbol(ctx.interner, path);
    let gate = ctx.design.add_node(
        name,
        NodeKind::Logic {
            op,
            rise: 0,
            fall: 0,
            decay: 0,
        },
        width + 1,
        span,
    );
    for bit in 0..width {
        let gp = ctx.design.nodes[gate].pin(bit + 1);
        let np = ctx.design.signals[net].pin(bit);
        ctx.design.links.connect(gp, np);
    }
    let holder = local_signal(ctx, scope, 1, span);
    let out = ctx.design.nodes[gate].pin(0);
    let hp = ctx.design.signals[holder].pin(0);
    ctx.design.links.connect(out, hp);
    holder
}

/// Builds a bank of identical per-bit gates over one or two operands.
fn gate_bank(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    op: LogicOp,
    inputs: &[NetId],
    span: Span,
    rise: u64,
    fall: u64,
    decay: u64,
) -> NetId {
    let path = ctx.design.scope_path(scope);
    let width = ctx.design.signals[inputs[0]].width();
    let holder = local_signal(ctx, scope, width, span);
    let base = ctx.design.local_symbol(ctx.interner, path);
    for bit in 0..width {
        let name = ctx
            .interner
            .get_or_intern(&format!("{}<{}>", ctx.name(base), bit));
        let gate = ctx.design.add_node(
            name,
            NodeKind::Logic {
                op,
                rise,
                fall,
                decay,
            },
            inputs.len() as u32 + 1,
            span,
        );
        let out = ctx.design.nodes[gate].pin(0);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(out, hp);
        for (i, &input) in inputs.iter().enumerate() {
            let gp = ctx.design.nodes[gate].pin(i as u32 + 1);
            let np = ctx.design.signals[input].pin(bit);
            ctx.design.links.connect(gp, np);
        }
    }
    holder
}

#[allow(clippy::too_many_arguments)]
fn elaborate_net_unary(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    op: UnaryOp,
    operand: &PExpr,
    span: Span,
    rise: u64,
    fall: u64,
    decay: u64,
) -> Option<NetId> {
    let net = elaborate_net(ctx, scope, operand, 0, 0, 0, 0)?;
    Some(match op {
        UnaryOp::BitNot => gate_bank(ctx, scope, LogicOp::Not, &[net], span, rise, fall, decay),
        UnaryOp::ReduceAnd => reduction_gate(ctx, scope, LogicOp::And, net, span),
        UnaryOp::ReduceOr => reduction_gate(ctx, scope, LogicOp::Or, net, span),
        UnaryOp::ReduceXor => reduction_gate(ctx, scope, LogicOp::Xor, net, span),
        UnaryOp::ReduceNand => reduction_gate(ctx, scope, LogicOp::Nand, net, span),
        UnaryOp::ReduceNor => reduction_gate(ctx, scope, LogicOp::Nor, net, span),
        UnaryOp::ReduceXnor => reduction_gate(ctx, scope, LogicOp::Xnor, net, span),
        UnaryOp::LogicalNot => reduction_gate(ctx, scope, LogicOp::Nor, net, span),
        UnaryOp::Neg => {
            // 0 - x through an adder/subtractor
            let width = ctx.design.signals[net].width();
            let zero = const_net(ctx, scope, LogicVec::new(width), span);
            addsub_node(ctx, scope, zero, net, width, true, span)
        }
    })
}

fn addsub_node(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    a: NetId,
    b: NetId,
    width: u32,
    sub: bool,
    span: Span,
) -> NetId {
    let path = ctx.design.scope_path(scope);
    let a = pad_net(ctx, scope, a, width, span);
    let b = pad_net(ctx, scope, b, width, span);
    let name = ctx.design.local_symbol(ctx.interner, path);
    let node = ctx
        .design
        .add_node(name, NodeKind::AddSub { width, sub }, 0, span);
    let holder = local_signal(ctx, scope, width, span);
    for bit in 0..width {
        let result = ctx.design.nodes[node].pin(bit);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(result, hp);
        let pa = ctx.design.nodes[node].pin(width + bit);
        let sa = ctx.design.signals[a].pin(bit);
        ctx.design.links.connect(pa, sa);
        let pb = ctx.design.nodes[node].pin(2 * width + bit);
        let sb = ctx.design.signals[b].pin(bit);
        ctx.design.links.connect(pb, sb);
    }
    holder
}

#[allow(clippy::too_many_arguments)]
fn elaborate_net_binary(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    op: BinaryOp,
    left: &PExpr,
    right: &PExpr,
    span: Span,
    rise: u64,
    fall: u64,
    decay: u64,
) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    match op {
        BinaryOp::Add | BinaryOp::Sub => {
            let l = elaborate_net(ctx, scope, left, 0, 0, 0, 0)?;
            let r = elaborate_net(ctx, scope, right, 0, 0, 0, 0)?;
            let width = ctx.design.signals[l]
                .width()
                .max(ctx.design.signals[r].width());
            Some(addsub_node(
                ctx,
                scope,
                l,
                r,
                width,
                op == BinaryOp::Sub,
                span,
            ))
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::BitXnor => {
            let l = elaborate_net(ctx, scope, left, 0, 0, 0, 0)?;
            let r = elaborate_net(ctx, scope, right, 0, 0, 0, 0)?;
            let width = ctx.design.signals[l]
                .width()
                .max(ctx.design.signals[r].width());
            let l = pad_net(ctx, scope, l, width, span);
            let r = pad_net(ctx, scope, r, width, span);
            let gate = match op {
                BinaryOp::BitAnd => LogicOp::And,
                BinaryOp::BitOr => LogicOp::Or,
                BinaryOp::BitXor => LogicOp::Xor,
                _ => LogicOp::Xnor,
            };
            Some(gate_bank(
                ctx,
                scope,
                gate,
                &[l, r],
                span,
                rise,
                fall,
                decay,
            ))
        }
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            let l = elaborate_net(ctx, scope, left, 0, 0, 0, 0)?;
            let r = elaborate_net(ctx, scope, right, 0, 0, 0, 0)?;
            let l = reduce_truth(ctx, scope, l, span);
            let r = reduce_truth(ctx, scope, r, span);
            let gate = if op == BinaryOp::LogicalAnd {
                LogicOp::And
            } else {
                LogicOp::Or
            };
            Some(gate_bank(ctx, scope, gate, &[l, r], span, 0, 0, 0))
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let l = elaborate_net(ctx, scope, left, 0, 0, 0, 0)?;
            let r = elaborate_net(ctx, scope, right, 0, 0, 0, 0)?;
            let width = ctx.design.signals[l]
                .width()
                .max(ctx.design.signals[r].width());
            let l = pad_net(ctx, scope, l, width, span);
            let r = pad_net(ctx, scope, r, width, span);
            let cop = match op {
                BinaryOp::Eq => CompOp::Eq,
                BinaryOp::Ne => CompOp::Ne,
                BinaryOp::Lt => CompOp::Lt,
                BinaryOp::Le => CompOp::Le,
                BinaryOp::Gt => CompOp::Gt,
                _ => CompOp::Ge,
            };
            let name = ctx.design.local_symbol(ctx.interner, path);
            let node = ctx
                .design
                .add_node(name, NodeKind::Compare { width, op: cop }, 0, span);
            let holder = local_signal(ctx, scope, 1, span);
            let rp = ctx.design.nodes[node].pin(0);
            let hp = ctx.design.signals[holder].pin(0);
            ctx.design.links.connect(rp, hp);
            for bit in 0..width {
                let pa = ctx.design.nodes[node].pin(1 + bit);
                let sa = ctx.design.signals[l].pin(bit);
                ctx.design.links.connect(pa, sa);
                let pb = ctx.design.nodes[node].pin(1 + width + bit);
                let sb = ctx.design.signals[r].pin(bit);
                ctx.design.links.connect(pb, sb);
            }
            Some(holder)
        }
        BinaryOp::Shl | BinaryOp::Shr => {
            let Some(amount) = eval_const_long(ctx, path, right) else {
                ctx.emit(errors::sorry_structural_op("a non-constant shift", span));
                return None;
            };
            let amount = amount.max(0) as u32;
            let l = elaborate_net(ctx, scope, left, 0, 0, 0, 0)?;
            let width = ctx.design.signals[l].width();
            let holder = local_signal(ctx, scope, width, span);
            let kept = width.saturating_sub(amount);
            let zeros = const_net(ctx, scope, LogicVec::new(width - kept), span);
            for i in 0..kept {
                let (h, s) = if op == BinaryOp::Shl {
                    (i + amount, i)
                } else {
                    (i, i + amount)
                };
                let hp = ctx.design.signals[holder].pin(h);
                let sp = ctx.design.signals[l].pin(s);
                ctx.design.links.connect(hp, sp);
            }
            for i in 0..(width - kept) {
                let h = if op == BinaryOp::Shl { i } else { kept + i };
                let hp = ctx.design.signals[holder].pin(h);
                let zp = ctx.design.signals[zeros].pin(i);
                ctx.design.links.connect(hp, zp);
            }
            Some(holder)
        }
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            ctx.emit(errors::sorry_structural_op(
                "multiply/divide/modulus",
                span,
            ));
            None
        }
        BinaryOp::CaseEq | BinaryOp::CaseNe => {
            ctx.emit(errors::sorry_structural_op("case equality", span));
            None
        }
    }
}

fn elaborate_net_ternary(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    cond: &PExpr,
    then_expr: &PExpr,
    else_expr: &PExpr,
    span: Span,
) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    let c = elaborate_net(ctx, scope, cond, 0, 0, 0, 0)?;
    let c = reduce_truth(ctx, scope, c, span);
    let t = elaborate_net(ctx, scope, then_expr, 0, 0, 0, 0)?;
    let e = elaborate_net(ctx, scope, else_expr, 0, 0, 0, 0)?;
    let width = ctx.design.signals[t]
        .width()
        .max(ctx.design.signals[e].width());
    let t = pad_net(ctx, scope, t, width, span);
    let e = pad_net(ctx, scope, e, width, span);
    let name = ctx.design.local_symbol(ctx.interner, path);
    let node = ctx
        .design
        .add_node(name, NodeKind::Mux { width }, 0, span);
    let holder = local_signal(ctx, scope, width, span);
    let sel = ctx.design.nodes[node].pin(width);
    let cp = ctx.design.signals[c].pin(0);
    ctx.design.links.connect(sel, cp);
    for bit in 0..width {
        let rp = ctx.design.nodes[node].pin(bit);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(rp, hp);
        let ap = ctx.design.nodes[node].pin(width + 1 + bit);
        let tp = ctx.design.signals[t].pin(bit);
        ctx.design.links.connect(ap, tp);
        let bp = ctx.design.nodes[node].pin(2 * width + 1 + bit);
        let ep = ctx.design.signals[e].pin(bit);
        ctx.design.links.connect(bp, ep);
    }
    Some(holder)
}

fn elaborate_net_concat(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    parts: &[PExpr],
    repeat: Option<&PExpr>,
    span: Span,
) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    let rep = match repeat {
        Some(r) => match eval_const_long(ctx, path, r) {
            Some(n) if n >= 0 => n as u32,
            _ => {
                ctx.emit(errors::error_not_constant("a repeat count", span));
                return None;
            }
        },
        None => 1,
    };
    let nets = parts
        .iter()
        .map(|p| elaborate_net(ctx, scope, p, 0, 0, 0, 0))
        .collect::<Option<Vec<_>>>()?;
    let part_width: u32 = nets.iter().map(|&n| ctx.design.signals[n].width()).sum();
    let holder = local_signal(ctx, scope, part_width * rep, span);
    let mut at = 0;
    for _ in 0..rep {
        // least significant operand last in textual order
        for &net in nets.iter().rev() {
            for bit in 0..ctx.design.signals[net].width() {
                let hp = ctx.design.signals[holder].pin(at);
                let np = ctx.design.signals[net].pin(bit);
                ctx.design.links.connect(hp, np);
                at += 1;
            }
        }
    }
    Some(holder)
}

fn elaborate_net_call(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    name: Ident,
    args: &[PExpr],
    span: Span,
) -> Option<NetId> {
    let path = ctx.design.scope_path(scope);
    let leaf = ctx.name(name).to_string();
    let Some(def) = crate::expr::find_definition(ctx, path, &leaf, true) else {
        ctx.emit(errors::error_unknown_function(&leaf, span));
        return None;
    };
    let ports = ctx.design.functions[&def].ports.clone();
    if args.len() != ports.len() - 1 {
        ctx.emit(errors::error_call_arity(&leaf, span));
        return None;
    }
    let arg_nets = args
        .iter()
        .map(|a| elaborate_net(ctx, scope, a, 0, 0, 0, 0))
        .collect::<Option<Vec<_>>>()?;
    let ret_width = ctx.design.signals[ports[0]].width();
    let total: u32 = ret_width
        + arg_nets
            .iter()
            .map(|&n| ctx.design.signals[n].width())
            .sum::<u32>();
    let node_name = ctx.design.local_symbol(ctx.interner, path);
    let node = ctx
        .design
        .add_node(node_name, NodeKind::UFunc { def }, total, span);
    let holder = local_signal(ctx, scope, ret_width, span);
    for bit in 0..ret_width {
        let rp = ctx.design.nodes[node].pin(bit);
        let hp = ctx.design.signals[holder].pin(bit);
        ctx.design.links.connect(rp, hp);
    }
    let mut at = ret_width;
    for &arg in &arg_nets {
        for bit in 0..ctx.design.signals[arg].width() {
            let np = ctx.design.nodes[node].pin(at);
            let ap = ctx.design.signals[arg].pin(bit);
            ctx.design.links.connect(np, ap);
            at += 1;
        }
    }
    Some(holder)
}
