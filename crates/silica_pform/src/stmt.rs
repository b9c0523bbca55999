//! Parsed behavioral statements.

use crate::expr::{PEventExpr, PExpr};
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;

/// Whether a block runs its statements sequentially or in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// `begin ... end`.
    Sequential,
    /// `fork ... join`.
    Parallel,
}

/// The matching flavor of a case statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseKind {
    /// Exact 4-state matching (`case`).
    Case,
    /// `x` and `z` bits are wildcards (`casex`).
    Casex,
    /// `z` bits are wildcards (`casez`).
    Casez,
}

/// One item of a case statement: a guard list and an optional body.
///
/// An empty guard list marks the `default` item. A missing body is legal
/// (`guard: ;`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PCaseItem {
    /// The guard expressions; empty for the default item.
    pub guards: Vec<PExpr>,
    /// The body statement, if any.
    pub stmt: Option<Box<Statement>>,
    /// Source location.
    pub span: Span,
}

/// A parsed behavioral statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A blocking assignment, optionally delayed by `#delay` or `@(events)`.
    Assign {
        /// The l-value expression (identifier with optional selects, or
        /// a concatenation of l-values).
        lval: PExpr,
        /// The r-value expression.
        rval: PExpr,
        /// An intra-assignment `#delay`, if any.
        delay: Option<PExpr>,
        /// An intra-assignment `@(events)` control, if any.
        event: Option<Vec<PEventExpr>>,
        /// Source location.
        span: Span,
    },
    /// A non-blocking assignment `lval <= rval`.
    AssignNb {
        /// The l-value expression.
        lval: PExpr,
        /// The r-value expression.
        rval: PExpr,
        /// Delay expressions (zero to three), stored on the node.
        delays: Vec<PExpr>,
        /// Source location.
        span: Span,
    },
    /// A `begin/end` or `fork/join` block, possibly named.
    Block {
        /// Sequential or parallel execution.
        kind: BlockKind,
        /// The block label, if the source named it.
        name: Option<Ident>,
        /// The contained statements in order.
        stmts: Vec<Statement>,
        /// Source location.
        span: Span,
    },
    /// A case statement.
    Case {
        /// The matching flavor.
        kind: CaseKind,
        /// The scrutinee expression.
        expr: PExpr,
        /// The case items.
        items: Vec<PCaseItem>,
        /// Source location.
        span: Span,
    },
    /// An `if`/`else` statement; either branch may be absent.
    Condit {
        /// The condition expression.
        cond: PExpr,
        /// The `if` branch.
        if_stmt: Option<Box<Statement>>,
        /// The `else` branch.
        else_stmt: Option<Box<Statement>>,
        /// Source location.
        span: Span,
    },
    /// A `#delay` statement with an optional guarded statement.
    Delay {
        /// The delay count expression; must be constant.
        delay: PExpr,
        /// The statement to run after the delay, if any.
        stmt: Option<Box<Statement>>,
        /// Source location.
        span: Span,
    },
    /// An `@(event, ...)` wait with an optional body (`@(e) ;` is legal).
    EventWait {
        /// The watched event expressions.
        events: Vec<PEventExpr>,
        /// The body statement, if any.
        stmt: Option<Box<Statement>>,
        /// Source location.
        span: Span,
    },
    /// A `forever` loop.
    Forever {
        /// The loop body.
        stmt: Box<Statement>,
        /// Source location.
        span: Span,
    },
    /// A `for` loop. The init and step parts are identifier-targeted
    /// assignments by construction.
    For {
        /// The identifier assigned by the init part.
        init_lval: PExpr,
        /// The init expression.
        init_rval: PExpr,
        /// The loop condition.
        cond: PExpr,
        /// The identifier assigned by the step part.
        step_lval: PExpr,
        /// The step expression.
        step_rval: PExpr,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        span: Span,
    },
    /// A `repeat (count)` loop.
    Repeat {
        /// The repetition count expression.
        count: PExpr,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        span: Span,
    },
    /// A `while (cond)` loop.
    While {
        /// The loop condition.
        cond: PExpr,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        span: Span,
    },
    /// A task enable. Names starting with `$` denote system tasks.
    CallTask {
        /// The task name.
        name: Ident,
        /// The argument expressions; positions may be empty.
        args: Vec<Option<PExpr>>,
        /// Source location.
        span: Span,
    },
}

impl Statement {
    /// Returns the source location of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign { span, .. }
            | Statement::AssignNb { span, .. }
            | Statement::Block { span, .. }
            | Statement::Case { span, .. }
            | Statement::Condit { span, .. }
            | Statement::Delay { span, .. }
            | Statement::EventWait { span, .. }
            | Statement::Forever { span, .. }
            | Statement::For { span, .. }
            | Statement::Repeat { span, .. }
            | Statement::While { span, .. }
            | Statement::CallTask { span, .. } => *span,
        }
    }
}
