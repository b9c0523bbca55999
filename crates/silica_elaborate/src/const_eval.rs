//! Constant evaluation of parse-tree expressions.
//!
//! Folds a parse expression to a 4-state vector when it is built from
//! literals, resolved parameters, and arithmetic over them. Returns
//! `None` ("unknown") when any sub-expression references a signal, a
//! function, or an unresolved parameter; callers then fall back to
//! expression lowering. No diagnostics are emitted here — the caller
//! knows whether a constant was required.

use silica_common::{Ident, LogicVec};
use silica_pform::{BinaryOp, PExpr, UnaryOp};

use crate::context::ElabCtx;

/// Evaluates `expr` to a constant in the scope named by `path`.
pub fn eval_const(ctx: &ElabCtx, path: Ident, expr: &PExpr) -> Option<LogicVec> {
    match expr {
        PExpr::Number { value, .. } => Some(value.clone()),
        PExpr::String { value, .. } => Some(string_to_vec(value)),
        PExpr::Ident {
            name,
            msb: None,
            lsb: None,
            ..
        } => {
            let param = ctx
                .design
                .find_parameter(ctx.interner, path, ctx.interner.resolve(*name))?
                .clone();
            param.eval_tree(&ctx.design)
        }
        // selects never denote constants
        PExpr::Ident { .. } => None,
        PExpr::Unary { op, operand, .. } => {
            let v = eval_const(ctx, path, operand)?;
            match op {
                UnaryOp::Neg => Some(v.neg()),
                UnaryOp::BitNot => Some(!&v),
                UnaryOp::LogicalNot => Some(v.logical_not()),
                _ => None,
            }
        }
        PExpr::Binary {
            op, left, right, ..
        } => {
            let l = eval_const(ctx, path, left)?;
            let r = eval_const(ctx, path, right)?;
            eval_binary(*op, &l, &r)
        }
        PExpr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => {
            let c = eval_const(ctx, path, cond)?;
            match c.as_truth() {
                silica_common::Logic::One => eval_const(ctx, path, then_expr),
                silica_common::Logic::Zero => eval_const(ctx, path, else_expr),
                _ => None,
            }
        }
        PExpr::Concat { parts, repeat, .. } => {
            let rep = match repeat {
                Some(r) => eval_const(ctx, path, r)?.as_long()? as u32,
                None => 1,
            };
            let folded = parts
                .iter()
                .map(|p| eval_const(ctx, path, p))
                .collect::<Option<Vec<_>>>()?;
            Some(LogicVec::concat(&folded).repeated(rep))
        }
        PExpr::FuncCall { .. } => None,
    }
}

/// Evaluates `expr` to a constant and projects it to an integer.
pub fn eval_const_long(ctx: &ElabCtx, path: Ident, expr: &PExpr) -> Option<i64> {
    eval_const(ctx, path, expr)?.as_long()
}

fn eval_binary(op: BinaryOp, l: &LogicVec, r: &LogicVec) -> Option<LogicVec> {
    Some(match op {
        BinaryOp::Add => l.add(r),
        BinaryOp::Sub => l.sub(r),
        BinaryOp::Mul => l.mul(r),
        BinaryOp::Div => l.div(r),
        BinaryOp::Mod => l.rem(r),
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        BinaryOp::BitXnor => !&(l ^ r),
        BinaryOp::LogicalAnd => LogicVec::filled(1, l.as_truth() & r.as_truth()),
        BinaryOp::LogicalOr => LogicVec::filled(1, l.as_truth() | r.as_truth()),
        BinaryOp::Eq => l.cmp_eq(r),
        BinaryOp::Ne => l.cmp_ne(r),
        BinaryOp::Lt => l.cmp_lt(r),
        BinaryOp::Le => l.cmp_le(r),
        BinaryOp::Gt => l.cmp_gt(r),
        BinaryOp::Ge => l.cmp_ge(r),
        BinaryOp::Shl => l.shl(u32::try_from(r.as_long()?).ok()?),
        BinaryOp::Shr => l.shr(u32::try_from(r.as_long()?).ok()?),
        // case equality keeps x/z semantics the evaluator does not model
        BinaryOp::CaseEq | BinaryOp::CaseNe => return None,
    })
}

/// Encodes a string literal as a bit vector, 8 bits per character with
/// the first character most significant.
pub fn string_to_vec(s: &str) -> LogicVec {
    let parts: Vec<LogicVec> = s
        .bytes()
        .map(|b| LogicVec::from_u64(b as u64, 8))
        .collect();
    if parts.is_empty() {
        LogicVec::new(8)
    } else {
        LogicVec::concat(&parts)
    }
}

/// Evaluates the delay expressions of a gate or assignment.
///
/// One expression sets rise, fall, and decay alike; two set rise and fall
/// with decay the minimum of the two; three set each independently. A
/// non-constant delay is reported (`sorry`) and treated as zero.
pub fn eval_delays(
    ctx: &mut ElabCtx,
    path: Ident,
    delays: &[PExpr],
) -> (u64, u64, u64) {
    let mut eval_one = |ctx: &mut ElabCtx, e: &PExpr| -> u64 {
        match eval_const(ctx, path, e).and_then(|v| v.as_long()) {
            Some(v) if v >= 0 => v as u64,
            _ => {
                ctx.emit(crate::errors::sorry_nonconstant_delay(e.span()));
                0
            }
        }
    };
    match delays {
        [] => (0, 0, 0),
        [d] => {
            let v = eval_one(ctx, d);
            (v, v, v)
        }
        [r, f] => {
            let rise = eval_one(ctx, r);
            let fall = eval_one(ctx, f);
            (rise, fall, rise.min(fall))
        }
        [r, f, d, ..] => {
            let rise = eval_one(ctx, r);
            let fall = eval_one(ctx, f);
            let decay = eval_one(ctx, d);
            (rise, fall, decay)
        }
    }
}
