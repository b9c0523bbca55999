//! Parse-tree expressions.

use serde::{Deserialize, Serialize};
use silica_common::{Ident, LogicVec};
use silica_source::Span;

/// A unary operator in a parse expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation `-`.
    Neg,
    /// Logical negation `!`.
    LogicalNot,
    /// Bitwise complement `~`.
    BitNot,
    /// Reduction AND `&`.
    ReduceAnd,
    /// Reduction OR `|`.
    ReduceOr,
    /// Reduction XOR `^`.
    ReduceXor,
    /// Reduction NAND `~&`.
    ReduceNand,
    /// Reduction NOR `~|`.
    ReduceNor,
    /// Reduction XNOR `~^`.
    ReduceXnor,
}

/// A binary operator in a parse expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition `+`.
    Add,
    /// Subtraction `-`.
    Sub,
    /// Multiplication `*`.
    Mul,
    /// Division `/`.
    Div,
    /// Modulus `%`.
    Mod,
    /// Bitwise AND `&`.
    BitAnd,
    /// Bitwise OR `|`.
    BitOr,
    /// Bitwise XOR `^`.
    BitXor,
    /// Bitwise XNOR `~^`.
    BitXnor,
    /// Logical AND `&&`.
    LogicalAnd,
    /// Logical OR `||`.
    LogicalOr,
    /// Logical equality `==`.
    Eq,
    /// Logical inequality `!=`.
    Ne,
    /// Case equality `===`.
    CaseEq,
    /// Case inequality `!==`.
    CaseNe,
    /// Less than `<`.
    Lt,
    /// Less than or equal `<=`.
    Le,
    /// Greater than `>`.
    Gt,
    /// Greater than or equal `>=`.
    Ge,
    /// Left shift `<<`.
    Shl,
    /// Right shift `>>`.
    Shr,
}

/// A parse-tree expression.
///
/// Expressions appear as r-values, l-values (a constrained subset), delay
/// counts, part-select bounds, and parameter defaults. Elaboration decides
/// per context whether an expression becomes a constant, a structural net,
/// or a procedural expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PExpr {
    /// A sized numeric literal holding a 4-state vector.
    Number {
        /// The literal value.
        value: LogicVec,
        /// Source location.
        span: Span,
    },
    /// A string literal.
    String {
        /// The string contents, without quotes.
        value: String,
        /// Source location.
        span: Span,
    },
    /// An identifier with optional bit-select (`msb` only) or part-select
    /// (`msb` and `lsb`).
    Ident {
        /// The referenced name.
        name: Ident,
        /// The bit-select or part-select high bound.
        msb: Option<Box<PExpr>>,
        /// The part-select low bound; `None` for a plain bit-select.
        lsb: Option<Box<PExpr>>,
        /// Source location.
        span: Span,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<PExpr>,
        /// Source location.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        left: Box<PExpr>,
        /// The right operand.
        right: Box<PExpr>,
        /// Source location.
        span: Span,
    },
    /// A ternary `cond ? t : f` expression.
    Ternary {
        /// The condition.
        cond: Box<PExpr>,
        /// The value when the condition is true.
        then_expr: Box<PExpr>,
        /// The value when the condition is false.
        else_expr: Box<PExpr>,
        /// Source location.
        span: Span,
    },
    /// A concatenation `{a, b, ...}` with an optional repeat count
    /// `{n{...}}`.
    Concat {
        /// The operands in textual (most-significant-first) order.
        parts: Vec<PExpr>,
        /// The repeat count, if this is a repeat concatenation.
        repeat: Option<Box<PExpr>>,
        /// Source location.
        span: Span,
    },
    /// A function call.
    FuncCall {
        /// The called function name.
        name: Ident,
        /// The argument expressions.
        args: Vec<PExpr>,
        /// Source location.
        span: Span,
    },
}

impl PExpr {
    /// Returns the source location of this expression.
    pub fn span(&self) -> Span {
        match self {
            PExpr::Number { span, .. }
            | PExpr::String { span, .. }
            | PExpr::Ident { span, .. }
            | PExpr::Unary { span, .. }
            | PExpr::Binary { span, .. }
            | PExpr::Ternary { span, .. }
            | PExpr::Concat { span, .. }
            | PExpr::FuncCall { span, .. } => *span,
        }
    }

    /// Convenience constructor for a plain identifier reference.
    pub fn ident(name: Ident, span: Span) -> Self {
        PExpr::Ident {
            name,
            msb: None,
            lsb: None,
            span,
        }
    }

    /// Convenience constructor for a numeric literal.
    pub fn number(value: LogicVec, span: Span) -> Self {
        PExpr::Number { value, span }
    }
}

/// The edge kind of an event expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `posedge expr` — rising edge.
    Posedge,
    /// `negedge expr` — falling edge.
    Negedge,
    /// Any change of any bit of the expression.
    Anyedge,
    /// Level-sensitive wait.
    Level,
}

/// One event expression inside an `@(...)` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PEventExpr {
    /// The edge to detect.
    pub edge: EdgeKind,
    /// The watched expression.
    pub expr: PExpr,
    /// Source location.
    pub span: Span,
}
