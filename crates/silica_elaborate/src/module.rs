//! Module elaboration: parameters, wires, definitions, gates, behaviors.

use std::collections::HashMap;

use silica_common::Ident;
use silica_netlist::{NetExpr, NetProcTop, ProcessKind, ScopeId};
use silica_pform::{Module, ParamOverrides, PExpr};

use crate::context::ElabCtx;
use crate::errors;
use crate::expr::elaborate_expr;
use crate::gates::elaborate_gate;
use crate::stmt::elaborate_stmt;
use crate::tasks::{elaborate_functions, elaborate_tasks};
use crate::wires::elaborate_wire;

/// Elaborates one instance of a module into `scope`.
///
/// `overrides` carries the instantiation's parameter overrides, if any;
/// override expressions are elaborated in the *parent* scope, defaults in
/// the instance scope. Returns `false` when a behavioral process failed
/// entirely — the caller treats that as a hard failure.
pub fn elaborate_module(
    ctx: &mut ElabCtx,
    module: &Module,
    scope: ScopeId,
    overrides: Option<&ParamOverrides>,
) -> bool {
    elaborate_params(ctx, module, scope, overrides);

    for wire in &module.wires {
        elaborate_wire(ctx, scope, wire);
    }

    // Definitions go in before gates and behaviors so that calls resolve,
    // and functions before tasks so task bodies may call functions.
    elaborate_functions(ctx, module, scope);
    elaborate_tasks(ctx, module, scope);

    for gate in &module.gates {
        elaborate_gate(ctx, scope, gate);
    }

    let mut result = true;
    for process in &module.behaviors {
        let Some(statement) = elaborate_stmt(ctx, scope, &process.statement) else {
            ctx.emit(errors::error_process_failed(process.span));
            result = false;
            continue;
        };
        let kind = match process.kind {
            silica_pform::ProcessKind::Initial => ProcessKind::Initial,
            silica_pform::ProcessKind::Always => ProcessKind::Always,
        };
        ctx.design.add_process(NetProcTop {
            kind,
            statement,
            span: process.span,
        });
    }
    result
}

/// Elaborates the parameters of a module instance.
///
/// Three sweeps: pre-declare every name as an opaque placeholder (so
/// expression lowering can see them), install the chosen expression
/// (override or default), then fold everything to constants by iterating
/// to a fixed point.
fn elaborate_params(
    ctx: &mut ElabCtx,
    module: &Module,
    scope: ScopeId,
    overrides: Option<&ParamOverrides>,
) {
    let path = ctx.design.scope_path(scope);

    for param in &module.params {
        let fq = ctx.interner.join(path, ctx.name(param.name));
        ctx.design.set_parameter(fq, NetExpr::Param(fq));
    }

    let mut replace: HashMap<Ident, &PExpr> = HashMap::new();
    match overrides {
        Some(ParamOverrides::Positional(exprs)) => {
            for (param, expr) in module.params.iter().zip(exprs) {
                replace.insert(param.name, expr);
            }
        }
        Some(ParamOverrides::Named(pairs)) => {
            for (name, expr) in pairs {
                replace.insert(*name, expr);
            }
        }
        None => {}
    }

    let parent = ctx.design.scopes[scope].parent.unwrap_or(scope);
    for param in &module.params {
        let fq = ctx.interner.join(path, ctx.name(param.name));
        let lowered = match replace.get(&param.name) {
            Some(expr) => elaborate_expr(ctx, parent, expr),
            None => elaborate_expr(ctx, scope, &param.default),
        };
        // a failed override keeps the placeholder; the fixpoint reports it
        if let Some(expr) = lowered {
            ctx.design.set_parameter(fq, expr);
        }
    }

    // Parameters may reference each other; fold until nothing changes.
    loop {
        let mut progress = false;
        for param in &module.params {
            let fq = ctx.interner.join(path, ctx.name(param.name));
            let Some(expr) = ctx.design.parameters.get(&fq) else {
                continue;
            };
            if matches!(expr, NetExpr::Const(_)) {
                continue;
            }
            if let Some(value) = expr.clone().eval_tree(&ctx.design) {
                ctx.design.set_parameter(fq, NetExpr::Const(value));
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    for param in &module.params {
        let fq = ctx.interner.join(path, ctx.name(param.name));
        if !matches!(ctx.design.parameters.get(&fq), Some(NetExpr::Const(_))) {
            ctx.emit(errors::error_param_not_const(
                ctx.name(param.name),
                param.span,
            ));
        }
    }
}
