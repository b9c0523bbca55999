//! Parsed module declarations.

use crate::gate::PGate;
use crate::stmt::Statement;
use crate::wire::PWire;
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;

/// A parameter declaration with its default expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// The parameter name.
    pub name: Ident,
    /// The default value expression.
    pub default: PExpr,
    /// Source location.
    pub span: Span,
}

use crate::expr::PExpr;

/// One position of a module's port list.
///
/// A port names one or more internal wires; the common case is exactly
/// one, but a port may be a concatenation of internal signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PPort {
    /// The externally visible port name, if the source gave one.
    pub name: Option<Ident>,
    /// The internal wires this port connects, most significant first.
    pub wires: Vec<Ident>,
    /// Source location.
    pub span: Span,
}

/// Whether a process runs once or repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// An `initial` process.
    Initial,
    /// An `always` process.
    Always,
}

/// A behavioral process (`initial` or `always` block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PProcess {
    /// Initial or always.
    pub kind: ProcessKind,
    /// The top statement of the process.
    pub statement: Statement,
    /// Source location.
    pub span: Span,
}

/// A user task definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PTaskDecl {
    /// The task name.
    pub name: Ident,
    /// The task's ports in declaration order, with directions.
    pub ports: Vec<PWire>,
    /// Wires declared inside the task body.
    pub wires: Vec<PWire>,
    /// The task body; a task with no statement elicits a warning.
    pub body: Option<Statement>,
    /// Source location.
    pub span: Span,
}

/// A user function definition.
///
/// The return value is modeled as a wire named after the function itself,
/// so a call site reads the result by that name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PFunctionDecl {
    /// The function name.
    pub name: Ident,
    /// The return-value wire; its name equals the function name.
    pub return_wire: PWire,
    /// The function's input ports in declaration order.
    pub ports: Vec<PWire>,
    /// Wires declared inside the function body.
    pub wires: Vec<PWire>,
    /// The function body.
    pub body: Statement,
    /// Source location.
    pub span: Span,
}

/// A parsed module declaration.
///
/// Parameters and ports are ordered; positional parameter overrides and
/// positional port bindings index into these lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: Ident,
    /// Ordered parameter declarations.
    pub params: Vec<ParamDecl>,
    /// Ordered port list.
    pub ports: Vec<PPort>,
    /// Declared wires, registers, integers, and memories.
    pub wires: Vec<PWire>,
    /// Gate-level items in source order.
    pub gates: Vec<PGate>,
    /// Behavioral processes in source order.
    pub behaviors: Vec<PProcess>,
    /// User task definitions.
    pub tasks: Vec<PTaskDecl>,
    /// User function definitions.
    pub functions: Vec<PFunctionDecl>,
    /// Source location.
    pub span: Span,
}

impl Module {
    /// Creates an empty module with the given name.
    pub fn new(name: Ident, span: Span) -> Self {
        Self {
            name,
            params: Vec::new(),
            ports: Vec::new(),
            wires: Vec::new(),
            gates: Vec::new(),
            behaviors: Vec::new(),
            tasks: Vec::new(),
            functions: Vec::new(),
            span,
        }
    }

    /// Returns the number of ports this module declares.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Finds the position of a port by its external name.
    pub fn find_port(&self, name: Ident) -> Option<usize> {
        self.ports.iter().position(|p| p.name == Some(name))
    }

    /// Returns the internal wire names of the port at `index`.
    pub fn get_port(&self, index: usize) -> &[Ident] {
        &self.ports[index].wires
    }

    /// Looks up a declared wire by name.
    pub fn get_wire(&self, name: Ident) -> Option<&PWire> {
        self.wires.iter().find(|w| w.name == name)
    }
}
