//! Lowering of parse expressions to procedural netlist expressions.
//!
//! This path is used for r-values of procedural assignments, conditions,
//! case guards, and task arguments. Structural contexts (continuous
//! assigns, gate pins, port bindings) use [`expr_net`](crate::expr_net)
//! instead.

use silica_common::Ident;
use silica_netlist::{BinOp, CompOp, NetExpr, ScopeId, UnOp};
use silica_pform::{BinaryOp, PExpr, UnaryOp};

use crate::const_eval::{eval_const_long, string_to_vec};
use crate::context::ElabCtx;
use crate::errors;

/// Lowers a parse expression to a procedural [`NetExpr`].
///
/// Reports a diagnostic and returns `None` when the expression cannot be
/// represented (unknown names, non-constant constructs in constant-only
/// positions).
pub fn elaborate_expr(ctx: &mut ElabCtx, scope: ScopeId, expr: &PExpr) -> Option<NetExpr> {
    let path = ctx.design.scope_path(scope);
    match expr {
        PExpr::Number { value, .. } => Some(NetExpr::Const(value.clone())),
        PExpr::String { value, .. } => Some(NetExpr::Const(string_to_vec(value))),
        PExpr::Ident {
            name, msb, lsb, ..
        } => elaborate_ident(ctx, scope, expr, *name, msb.as_deref(), lsb.as_deref()),
        PExpr::Unary { op, operand, .. } => {
            let inner = elaborate_expr(ctx, scope, operand)?;
            Some(match op {
                UnaryOp::BitNot => NetExpr::UBits {
                    operand: Box::new(inner),
                },
                UnaryOp::Neg => NetExpr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(inner),
                },
                UnaryOp::LogicalNot => NetExpr::Unary {
                    op: UnOp::LogicalNot,
                    operand: Box::new(inner),
                },
                UnaryOp::ReduceAnd => unary(UnOp::ReduceAnd, inner),
                UnaryOp::ReduceOr => unary(UnOp::ReduceOr, inner),
                UnaryOp::ReduceXor => unary(UnOp::ReduceXor, inner),
                UnaryOp::ReduceNand => unary(UnOp::ReduceNand, inner),
                UnaryOp::ReduceNor => unary(UnOp::ReduceNor, inner),
                UnaryOp::ReduceXnor => unary(UnOp::ReduceXnor, inner),
            })
        }
        PExpr::Binary {
            op, left, right, ..
        } => {
            let l = Box::new(elaborate_expr(ctx, scope, left)?);
            let r = Box::new(elaborate_expr(ctx, scope, right)?);
            Some(match map_binop(*op) {
                MappedOp::Arith(op) => NetExpr::Binary {
                    op,
                    left: l,
                    right: r,
                },
                MappedOp::Comp(op) => NetExpr::BComp {
                    op,
                    left: l,
                    right: r,
                },
            })
        }
        PExpr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => Some(NetExpr::Ternary {
            cond: Box::new(elaborate_expr(ctx, scope, cond)?),
            then_expr: Box::new(elaborate_expr(ctx, scope, then_expr)?),
            else_expr: Box::new(elaborate_expr(ctx, scope, else_expr)?),
        }),
        PExpr::Concat {
            parts,
            repeat,
            span,
        } => {
            let rep = match repeat {
                Some(r) => match eval_const_long(ctx, path, r) {
                    Some(n) if n >= 0 => n as u32,
                    _ => {
                        ctx.emit(errors::error_not_constant("a repeat count", *span));
                        return None;
                    }
                },
                None => 1,
            };
            let lowered = parts
                .iter()
                .map(|p| elaborate_expr(ctx, scope, p))
                .collect::<Option<Vec<_>>>()?;
            Some(NetExpr::Concat {
                parts: lowered,
                repeat: rep,
            })
        }
        PExpr::FuncCall { name, args, span } => {
            let leaf = ctx.interner.resolve(*name).to_string();
            let Some(def_path) = find_definition(ctx, path, &leaf, true) else {
                ctx.emit(errors::error_unknown_function(&leaf, *span));
                return None;
            };
            let port_count = ctx.design.functions[&def_path].ports.len() - 1;
            if args.len() != port_count {
                ctx.emit(errors::error_call_arity(&leaf, *span));
                return None;
            }
            let lowered = args
                .iter()
                .map(|a| elaborate_expr(ctx, scope, a))
                .collect::<Option<Vec<_>>>()?;
            Some(NetExpr::UFunc {
                def: def_path,
                args: lowered,
            })
        }
    }
}

/// Lowers an expression and folds it when it is constant.
pub fn elaborate_and_fold(ctx: &mut ElabCtx, scope: ScopeId, expr: &PExpr) -> Option<NetExpr> {
    let lowered = elaborate_expr(ctx, scope, expr)?;
    match lowered.eval_tree(&ctx.design) {
        Some(v) => Some(NetExpr::Const(v)),
        None => Some(lowered),
    }
}

fn unary(op: UnOp, inner: NetExpr) -> NetExpr {
    NetExpr::Unary {
        op,
        operand: Box::new(inner),
    }
}

enum MappedOp {
    Arith(BinOp),
    Comp(CompOp),
}

fn map_binop(op: BinaryOp) -> MappedOp {
    match op {
        BinaryOp::Add => MappedOp::Arith(BinOp::Add),
        BinaryOp::Sub => MappedOp::Arith(BinOp::Sub),
        BinaryOp::Mul => MappedOp::Arith(BinOp::Mul),
        BinaryOp::Div => MappedOp::Arith(BinOp::Div),
        BinaryOp::Mod => MappedOp::Arith(BinOp::Mod),
        BinaryOp::BitAnd => MappedOp::Arith(BinOp::BitAnd),
        BinaryOp::BitOr => MappedOp::Arith(BinOp::BitOr),
        BinaryOp::BitXor => MappedOp::Arith(BinOp::BitXor),
        BinaryOp::BitXnor => MappedOp::Arith(BinOp::BitXnor),
        BinaryOp::LogicalAnd => MappedOp::Arith(BinOp::LogicalAnd),
        BinaryOp::LogicalOr => MappedOp::Arith(BinOp::LogicalOr),
        BinaryOp::Shl => MappedOp::Arith(BinOp::Shl),
        BinaryOp::Shr => MappedOp::Arith(BinOp::Shr),
        BinaryOp::Eq => MappedOp::Comp(CompOp::Eq),
        BinaryOp::Ne => MappedOp::Comp(CompOp::Ne),
        BinaryOp::CaseEq => MappedOp::Comp(CompOp::CaseEq),
        BinaryOp::CaseNe => MappedOp::Comp(CompOp::CaseNe),
        BinaryOp::Lt => MappedOp::Comp(CompOp::Lt),
        BinaryOp::Le => MappedOp::Comp(CompOp::Le),
        BinaryOp::Gt => MappedOp::Comp(CompOp::Gt),
        BinaryOp::Ge => MappedOp::Comp(CompOp::Ge),
    }
}

fn elaborate_ident(
    ctx: &mut ElabCtx,
    scope: ScopeId,
    whole: &PExpr,
    name: Ident,
    msb: Option<&PExpr>,
    lsb: Option<&PExpr>,
) -> Option<NetExpr> {
    let path = ctx.design.scope_path(scope);
    let leaf = ctx.interner.resolve(name).to_string();
    let span = whole.span();

    // A bare name that resolves to a parameter in the scope chain is a
    // parameter reference.
    if msb.is_none() && lsb.is_none() {
        if let Some(fq) = find_parameter_fq(ctx, path, &leaf) {
            return Some(NetExpr::Param(fq));
        }
    }

    let Some(signal) = ctx.design.find_signal(ctx.interner, path, &leaf) else {
        ctx.emit(errors::error_unknown_signal(
            &leaf,
            ctx.interner.resolve(path),
            span,
        ));
        return None;
    };

    match (msb, lsb) {
        (None, None) => Some(NetExpr::Signal(signal)),
        (Some(m), Some(l)) => {
            let Some(mv) = eval_const_long(ctx, path, m) else {
                ctx.emit(errors::error_not_constant("a part-select bound", m.span()));
                return None;
            };
            let Some(lv) = eval_const_long(ctx, path, l) else {
                ctx.emit(errors::error_not_constant("a part-select bound", l.span()));
                return None;
            };
            let sig = &ctx.design.signals[signal];
            let a = sig.sb_to_idx(mv);
            let b = sig.sb_to_idx(lv);
            let (offset, top) = (a.min(b), a.max(b));
            if top >= sig.width() {
                ctx.emit(errors::error_cannot_elaborate(
                    "a part select outside the signal",
                    span,
                ));
                return None;
            }
            Some(NetExpr::Part {
                signal,
                offset,
                width: top - offset + 1,
            })
        }
        (Some(m), None) => match eval_const_long(ctx, path, m) {
            Some(v) => {
                let sig = &ctx.design.signals[signal];
                let idx = sig.sb_to_idx(v);
                if idx >= sig.width() {
                    ctx.emit(errors::error_cannot_elaborate(
                        "a bit select outside the signal",
                        span,
                    ));
                    return None;
                }
                Some(NetExpr::Part {
                    signal,
                    offset: idx,
                    width: 1,
                })
            }
            None => {
                let index = elaborate_expr(ctx, scope, m)?;
                Some(NetExpr::Bit {
                    signal,
                    index: Box::new(index),
                })
            }
        },
        (None, Some(_)) => {
            ctx.emit(errors::internal_unreachable(
                "part select with only a low bound",
                span,
            ));
            None
        }
    }
}

/// Finds the fully qualified name of a parameter visible from `path`.
pub fn find_parameter_fq(ctx: &ElabCtx, path: Ident, leaf: &str) -> Option<Ident> {
    let mut cur = Some(path);
    while let Some(p) = cur {
        let fq = ctx.interner.join(p, leaf);
        if ctx.design.parameters.contains_key(&fq) {
            return Some(fq);
        }
        cur = ctx.interner.parent(p);
    }
    None
}

/// Finds the fully qualified path of a task or function definition
/// visible from `path`.
pub fn find_definition(ctx: &ElabCtx, path: Ident, leaf: &str, function: bool) -> Option<Ident> {
    let mut cur = Some(path);
    while let Some(p) = cur {
        let fq = ctx.interner.join(p, leaf);
        let hit = if function {
            ctx.design.functions.contains_key(&fq)
        } else {
            ctx.design.tasks.contains_key(&fq)
        };
        if hit {
            return Some(fq);
        }
        cur = ctx.interner.parent(p);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_common::{Interner, Logic, LogicVec};
    use silica_diagnostics::DiagnosticSink;
    use silica_netlist::{Design, NetKind, PortClass};
    use silica_source::Span;
    use std::collections::HashMap;

    fn with_ctx<R>(f: impl FnOnce(&mut ElabCtx, ScopeId) -> R) -> R {
        let modules = HashMap::new();
        let primitives = HashMap::new();
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut design = Design::new();
        let root = design.make_root_scope(&interner, "top");
        let mut ctx = ElabCtx {
            design,
            modules: &modules,
            primitives: &primitives,
            interner: &interner,
            sink: &sink,
        };
        f(&mut ctx, root)
    }

    fn add_reg(ctx: &mut ElabCtx, scope: ScopeId, leaf: &str, msb: i64, lsb: i64) -> silica_netlist::NetId {
        let path = ctx.design.scope_path(scope);
        let name = ctx.interner.join(path, leaf);
        ctx.design.add_signal(
            scope,
            name,
            NetKind::Reg,
            PortClass::NotAPort,
            msb,
            lsb,
            Logic::X,
            false,
            Span::DUMMY,
        )
    }

    fn num(v: u64, w: u32) -> PExpr {
        PExpr::number(LogicVec::from_u64(v, w), Span::DUMMY)
    }

    #[test]
    fn plain_ident_becomes_signal_ref() {
        with_ctx(|ctx, scope| {
            let id = add_reg(ctx, scope, "q", 3, 0);
            let name = ctx.interner.get_or_intern("q");
            let e = elaborate_expr(ctx, scope, &PExpr::ident(name, Span::DUMMY)).unwrap();
            assert!(matches!(e, NetExpr::Signal(s) if s == id));
        });
    }

    #[test]
    fn unknown_ident_reports() {
        with_ctx(|ctx, scope| {
            let name = ctx.interner.get_or_intern("ghost");
            assert!(elaborate_expr(ctx, scope, &PExpr::ident(name, Span::DUMMY)).is_none());
            assert_eq!(ctx.design.errors, 1);
        });
    }

    #[test]
    fn parameter_ident_becomes_param_ref() {
        with_ctx(|ctx, scope| {
            let path = ctx.design.scope_path(scope);
            let fq = ctx.interner.join(path, "W");
            ctx.design
                .set_parameter(fq, NetExpr::Const(LogicVec::from_u64(8, 32)));
            let name = ctx.interner.get_or_intern("W");
            let e = elaborate_expr(ctx, scope, &PExpr::ident(name, Span::DUMMY)).unwrap();
            assert!(matches!(e, NetExpr::Param(p) if p == fq));
        });
    }

    #[test]
    fn constant_part_select_resolves_offsets() {
        with_ctx(|ctx, scope| {
            let id = add_reg(ctx, scope, "d", 7, 0);
            let name = ctx.interner.get_or_intern("d");
            let e = PExpr::Ident {
                name,
                msb: Some(Box::new(num(5, 32))),
                lsb: Some(Box::new(num(2, 32))),
                span: Span::DUMMY,
            };
            let lowered = elaborate_expr(ctx, scope, &e).unwrap();
            match lowered {
                NetExpr::Part {
                    signal,
                    offset,
                    width,
                } => {
                    assert_eq!(signal, id);
                    assert_eq!(offset, 2);
                    assert_eq!(width, 4);
                }
                other => panic!("expected Part, got {other:?}"),
            }
        });
    }

    #[test]
    fn nonconstant_bit_select_becomes_mux_read() {
        with_ctx(|ctx, scope| {
            add_reg(ctx, scope, "d", 7, 0);
            let i = add_reg(ctx, scope, "i", 2, 0);
            let dname = ctx.interner.get_or_intern("d");
            let iname = ctx.interner.get_or_intern("i");
            let e = PExpr::Ident {
                name: dname,
                msb: Some(Box::new(PExpr::ident(iname, Span::DUMMY))),
                lsb: None,
                span: Span::DUMMY,
            };
            let lowered = elaborate_expr(ctx, scope, &e).unwrap();
            match lowered {
                NetExpr::Bit { index, .. } => {
                    assert!(matches!(*index, NetExpr::Signal(s) if s == i));
                }
                other => panic!("expected Bit, got {other:?}"),
            }
        });
    }

    #[test]
    fn comparison_maps_to_bcomp() {
        with_ctx(|ctx, scope| {
            let e = PExpr::Binary {
                op: BinaryOp::Ne,
                left: Box::new(num(1, 4)),
                right: Box::new(num(0, 4)),
                span: Span::DUMMY,
            };
            let lowered = elaborate_expr(ctx, scope, &e).unwrap();
            assert!(matches!(lowered, NetExpr::BComp { op: CompOp::Ne, .. }));
        });
    }

    #[test]
    fn fold_collapses_constants() {
        with_ctx(|ctx, scope| {
            let e = PExpr::Binary {
                op: BinaryOp::Add,
                left: Box::new(num(2, 8)),
                right: Box::new(num(5, 8)),
                span: Span::DUMMY,
            };
            let lowered = elaborate_and_fold(ctx, scope, &e).unwrap();
            assert!(matches!(lowered, NetExpr::Const(v) if v.to_u64() == Some(7)));
        });
    }

    #[test]
    fn repeat_concat_needs_constant_count() {
        with_ctx(|ctx, scope| {
            add_reg(ctx, scope, "n", 3, 0);
            let n = ctx.interner.get_or_intern("n");
            let e = PExpr::Concat {
                parts: vec![num(1, 1)],
                repeat: Some(Box::new(PExpr::ident(n, Span::DUMMY))),
                span: Span::DUMMY,
            };
            assert!(elaborate_expr(ctx, scope, &e).is_none());
            assert_eq!(ctx.design.errors, 1);
        });
    }

    #[test]
    fn unknown_function_reports() {
        with_ctx(|ctx, scope| {
            let name = ctx.interner.get_or_intern("f");
            let e = PExpr::FuncCall {
                name,
                args: vec![],
                span: Span::DUMMY,
            };
            assert!(elaborate_expr(ctx, scope, &e).is_none());
            assert_eq!(ctx.design.errors, 1);
        });
    }
}
