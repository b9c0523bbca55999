//! Procedural expressions in the netlist.
//!
//! These are the r-value expressions attached to procedural assignments,
//! condition and guard expressions, and system-task arguments. Structural
//! r-values (those that feed gates) are lowered to nets instead and never
//! appear here.

use crate::design::Design;
use crate::ids::NetId;
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Logic, LogicVec};

/// A unary operator on a procedural expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation, producing one bit.
    LogicalNot,
    /// Reduction AND.
    ReduceAnd,
    /// Reduction OR.
    ReduceOr,
    /// Reduction XOR.
    ReduceXor,
    /// Reduction NAND.
    ReduceNand,
    /// Reduction NOR.
    ReduceNor,
    /// Reduction XNOR.
    ReduceXnor,
}

/// A binary operator on procedural expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulus.
    Mod,
    /// Bitwise AND.
    BitAnd,
    /// Bitwise OR.
    BitOr,
    /// Bitwise XOR.
    BitXor,
    /// Bitwise XNOR.
    BitXnor,
    /// Logical AND, producing one bit.
    LogicalAnd,
    /// Logical OR, producing one bit.
    LogicalOr,
    /// Left shift.
    Shl,
    /// Right shift.
    Shr,
}

/// A comparison operator; all comparisons produce one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompOp {
    /// Logical equality.
    Eq,
    /// Logical inequality.
    Ne,
    /// Case equality (`===`), matching `x` and `z` exactly.
    CaseEq,
    /// Case inequality (`!==`).
    CaseNe,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

/// A procedural expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NetExpr {
    /// A constant 4-state vector.
    Const(LogicVec),
    /// A reference to a whole signal.
    Signal(NetId),
    /// A constant part-select of a signal, in pin-index space.
    Part {
        /// The selected signal.
        signal: NetId,
        /// The pin index of the least significant selected bit.
        offset: u32,
        /// The number of selected bits.
        width: u32,
    },
    /// A dynamically indexed single-bit select of a signal.
    Bit {
        /// The selected signal.
        signal: NetId,
        /// The bit index expression.
        index: Box<NetExpr>,
    },
    /// A reference to a parameter by fully qualified name.
    ///
    /// During elaboration these act as placeholders; parameter folding
    /// replaces them with constants (parameter closure).
    Param(Ident),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnOp,
        /// The operand.
        operand: Box<NetExpr>,
    },
    /// The bitwise complement `~e`, applied bit by bit.
    UBits {
        /// The operand.
        operand: Box<NetExpr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinOp,
        /// The left operand.
        left: Box<NetExpr>,
        /// The right operand.
        right: Box<NetExpr>,
    },
    /// A comparison, producing one bit.
    BComp {
        /// The operator.
        op: CompOp,
        /// The left operand.
        left: Box<NetExpr>,
        /// The right operand.
        right: Box<NetExpr>,
    },
    /// A concatenation with a repeat count.
    Concat {
        /// The parts in textual (most-significant-first) order.
        parts: Vec<NetExpr>,
        /// The number of repetitions of the whole part list.
        repeat: u32,
    },
    /// A ternary select.
    Ternary {
        /// The condition.
        cond: Box<NetExpr>,
        /// The value when the condition is true.
        then_expr: Box<NetExpr>,
        /// The value when the condition is false.
        else_expr: Box<NetExpr>,
    },
    /// A call to a user function.
    ///
    /// The definition table entry carries the return signal, whose width
    /// is the width of this expression. Because definitions are installed
    /// before any body is lowered, recursive calls resolve.
    UFunc {
        /// The fully qualified path of the called function.
        def: Ident,
        /// The argument expressions in declaration order.
        args: Vec<NetExpr>,
    },
}

/// Recursion guard for parameter chains; a well-formed design never
/// approaches this.
const MAX_EVAL_DEPTH: u32 = 64;

impl NetExpr {
    /// Computes the bit width of this expression.
    ///
    /// Binary arithmetic takes the wider operand; logical operators and
    /// comparisons are one bit; an unresolved parameter has width 0 until
    /// folding replaces it.
    pub fn width(&self, des: &Design) -> u32 {
        match self {
            NetExpr::Const(v) => v.width(),
            NetExpr::Signal(net) => des.signals[*net].width(),
            NetExpr::Part { width, .. } => *width,
            NetExpr::Bit { .. } => 1,
            NetExpr::Param(name) => match des.parameters.get(name) {
                Some(NetExpr::Const(v)) => v.width(),
                _ => 0,
            },
            NetExpr::Unary { op, operand } => match op {
                UnOp::Neg => operand.width(des),
                _ => 1,
            },
            NetExpr::UBits { operand } => operand.width(des),
            NetExpr::Binary { op, left, right } => match op {
                BinOp::LogicalAnd | BinOp::LogicalOr => 1,
                BinOp::Shl | BinOp::Shr => left.width(des),
                _ => left.width(des).max(right.width(des)),
            },
            NetExpr::BComp { .. } => 1,
            NetExpr::Concat { parts, repeat } => {
                parts.iter().map(|p| p.width(des)).sum::<u32>() * repeat
            }
            NetExpr::Ternary {
                then_expr,
                else_expr,
                ..
            } => then_expr.width(des).max(else_expr.width(des)),
            NetExpr::UFunc { def, .. } => des
                .functions
                .get(def)
                .and_then(|f| f.ports.first())
                .map(|&ret| des.signals[ret].width())
                .unwrap_or(0),
        }
    }

    /// Folds this expression to a constant vector, if possible.
    ///
    /// Succeeds for constants, folded parameters, and compositions
    /// thereof. Any reference to a signal makes the result `None`, and
    /// callers fall back to keeping the expression tree. Applying
    /// `eval_tree` to the result of a previous fold returns the same
    /// vector.
    pub fn eval_tree(&self, des: &Design) -> Option<LogicVec> {
        self.eval_depth(des, 0)
    }

    fn eval_depth(&self, des: &Design, depth: u32) -> Option<LogicVec> {
        if depth > MAX_EVAL_DEPTH {
            return None;
        }
        match self {
            NetExpr::Const(v) => Some(v.clone()),
            NetExpr::Signal(_) | NetExpr::Part { .. } | NetExpr::Bit { .. } => None,
            NetExpr::Param(name) => des
                .parameters
                .get(name)?
                .eval_depth(des, depth + 1),
            NetExpr::Unary { op, operand } => {
                let v = operand.eval_depth(des, depth + 1)?;
                match op {
                    UnOp::Neg => Some(v.neg()),
                    UnOp::LogicalNot => Some(v.logical_not()),
                    // reductions fall back to structural lowering
                    _ => None,
                }
            }
            NetExpr::UBits { operand } => {
                let v = operand.eval_depth(des, depth + 1)?;
                Some(!&v)
            }
            NetExpr::Binary { op, left, right } => {
                let l = left.eval_depth(des, depth + 1)?;
                let r = right.eval_depth(des, depth + 1)?;
                Some(match op {
                    BinOp::Add => l.add(&r),
                    BinOp::Sub => l.sub(&r),
                    BinOp::Mul => l.mul(&r),
                    BinOp::Div => l.div(&r),
                    BinOp::Mod => l.rem(&r),
                    BinOp::BitAnd => &l & &r,
                    BinOp::BitOr => &l | &r,
                    BinOp::BitXor => &l ^ &r,
                    BinOp::BitXnor => !&(&l ^ &r),
                    BinOp::LogicalAnd => {
                        LogicVec::filled(1, l.as_truth() & r.as_truth())
                    }
                    BinOp::LogicalOr => LogicVec::filled(1, l.as_truth() | r.as_truth()),
                    BinOp::Shl => l.shl(r.as_long()? as u32),
                    BinOp::Shr => l.shr(r.as_long()? as u32),
                })
            }
            NetExpr::BComp { op, left, right } => {
                let l = left.eval_depth(des, depth + 1)?;
                let r = right.eval_depth(des, depth + 1)?;
                Some(match op {
                    CompOp::Eq => l.cmp_eq(&r),
                    CompOp::Ne => l.cmp_ne(&r),
                    CompOp::CaseEq => LogicVec::from_bool(l.case_eq(&r)),
                    CompOp::CaseNe => LogicVec::from_bool(!l.case_eq(&r)),
                    CompOp::Lt => l.cmp_lt(&r),
                    CompOp::Le => l.cmp_le(&r),
                    CompOp::Gt => l.cmp_gt(&r),
                    CompOp::Ge => l.cmp_ge(&r),
                })
            }
            NetExpr::Concat { parts, repeat } => {
                let folded = parts
                    .iter()
                    .map(|p| p.eval_depth(des, depth + 1))
                    .collect::<Option<Vec<_>>>()?;
                Some(LogicVec::concat(&folded).repeated(*repeat))
            }
            NetExpr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = cond.eval_depth(des, depth + 1)?;
                match c.as_truth() {
                    Logic::One => then_expr.eval_depth(des, depth + 1),
                    Logic::Zero => else_expr.eval_depth(des, depth + 1),
                    _ => None,
                }
            }
            NetExpr::UFunc { .. } => None,
        }
    }
}

/// Zero-extends `expr` to `width` by concatenating a zero constant above
/// it. Expressions already at least `width` bits wide are returned as-is.
pub fn pad_to_width(expr: NetExpr, width: u32, des: &Design) -> NetExpr {
    let have = expr.width(des);
    if have >= width {
        return expr;
    }
    NetExpr::Concat {
        parts: vec![NetExpr::Const(LogicVec::new(width - have)), expr],
        repeat: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;

    fn num(v: u64, w: u32) -> NetExpr {
        NetExpr::Const(LogicVec::from_u64(v, w))
    }

    #[test]
    fn const_folds_to_itself() {
        let des = Design::new();
        let e = num(5, 8);
        assert_eq!(e.eval_tree(&des).unwrap().to_u64(), Some(5));
    }

    #[test]
    fn binary_arithmetic_folds() {
        let des = Design::new();
        let e = NetExpr::Binary {
            op: BinOp::Add,
            left: Box::new(num(4, 8)),
            right: Box::new(num(3, 8)),
        };
        assert_eq!(e.eval_tree(&des).unwrap().to_u64(), Some(7));
        assert_eq!(e.width(&des), 8);
    }

    #[test]
    fn comparisons_fold_to_one_bit() {
        let des = Design::new();
        let e = NetExpr::BComp {
            op: CompOp::Ne,
            left: Box::new(num(4, 8)),
            right: Box::new(num(0, 8)),
        };
        let v = e.eval_tree(&des).unwrap();
        assert_eq!(v.width(), 1);
        assert_eq!(v.to_u64(), Some(1));
        assert_eq!(e.width(&des), 1);
    }

    #[test]
    fn ternary_folds_taken_branch() {
        let des = Design::new();
        let e = NetExpr::Ternary {
            cond: Box::new(num(1, 1)),
            then_expr: Box::new(num(10, 8)),
            else_expr: Box::new(num(20, 8)),
        };
        assert_eq!(e.eval_tree(&des).unwrap().to_u64(), Some(10));
    }

    #[test]
    fn concat_folds_in_textual_order() {
        let des = Design::new();
        let e = NetExpr::Concat {
            parts: vec![num(0b10, 2), num(0b01, 2)],
            repeat: 1,
        };
        assert_eq!(e.eval_tree(&des).unwrap().to_u64(), Some(0b1001));
    }

    #[test]
    fn eval_tree_is_idempotent() {
        let des = Design::new();
        let e = NetExpr::Binary {
            op: BinOp::Mul,
            left: Box::new(num(6, 8)),
            right: Box::new(num(7, 8)),
        };
        let once = e.eval_tree(&des).unwrap();
        let again = NetExpr::Const(once.clone()).eval_tree(&des).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn unresolved_param_does_not_fold() {
        let des = Design::new();
        let e = NetExpr::Param(Ident::from_raw(9));
        assert!(e.eval_tree(&des).is_none());
        assert_eq!(e.width(&des), 0);
    }

    #[test]
    fn pad_to_width_zero_extends() {
        let des = Design::new();
        let padded = pad_to_width(num(0b11, 2), 4, &des);
        assert_eq!(padded.width(&des), 4);
        assert_eq!(padded.eval_tree(&des).unwrap().to_u64(), Some(0b0011));
    }

    #[test]
    fn pad_to_width_leaves_wide_expressions() {
        let des = Design::new();
        let e = pad_to_width(num(5, 8), 4, &des);
        assert_eq!(e.width(&des), 8);
    }

    #[test]
    fn logical_ops_produce_one_bit() {
        let des = Design::new();
        let e = NetExpr::Binary {
            op: BinOp::LogicalAnd,
            left: Box::new(num(2, 4)),
            right: Box::new(num(1, 1)),
        };
        let v = e.eval_tree(&des).unwrap();
        assert_eq!(v.width(), 1);
        assert_eq!(v.to_u64(), Some(1));
    }
}
