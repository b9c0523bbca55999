//! Parse-tree-to-netlist elaboration.
//!
//! Elaboration takes a complete parse tree and the name of a root module,
//! and generates the elaborated design: a self-contained netlist that
//! references no other modules. Parameters are resolved, submodules are
//! recursively instantiated, behavioral statements are lowered to the
//! procedural tree, and continuous assigns and primitive gates become
//! structural nodes.

#![warn(missing_docs)]

pub mod const_eval;
pub mod context;
pub mod errors;
pub mod expr;
pub mod expr_net;
pub mod gates;
pub mod module;
pub mod stmt;
pub mod tasks;
pub mod wires;

use std::collections::HashMap;

use silica_common::{Ident, Interner};
use silica_diagnostics::DiagnosticSink;
use silica_netlist::Design;
use silica_pform::{Module, PUdp};

use crate::context::ElabCtx;

/// Elaborates the design rooted at `root`.
///
/// Returns `None` when the root module is not found, or when a behavioral
/// process failed to elaborate entirely (a hard failure). Otherwise the
/// design is returned even with a non-zero error count, so the caller can
/// decide whether to proceed; [`Design::errors`] holds the count.
pub fn elaborate(
    modules: &HashMap<Ident, Module>,
    primitives: &HashMap<Ident, PUdp>,
    root: Ident,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Option<Design> {
    let rmod = modules.get(&root)?;

    let mut design = Design::new();
    let root_scope = design.make_root_scope(interner, interner.resolve(root));

    let mut ctx = ElabCtx {
        design,
        modules,
        primitives,
        interner,
        sink,
    };

    let ok = module::elaborate_module(&mut ctx, rmod, root_scope, None);
    if !ok {
        return None;
    }
    Some(ctx.design)
}
