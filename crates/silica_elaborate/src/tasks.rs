//! Two-pass elaboration of user tasks and functions.
//!
//! Pass 1 creates the definition scope, elaborates the port and local
//! wires into it, and installs the signature (path and port signals) in
//! the design's definition table. Pass 2 lowers the body. Because every
//! signature is installed before any body is lowered, bodies may call
//! their own definition or each other freely.

use silica_netlist::{NetFuncDef, NetId, NetTaskDef, ScopeId, ScopeKind};
use silica_pform::{Module, PFunctionDecl, PTaskDecl};

use crate::context::ElabCtx;
use crate::errors;
use crate::stmt::elaborate_stmt;
use crate::wires::elaborate_wire;

/// Runs both passes over a module's functions.
pub fn elaborate_functions(ctx: &mut ElabCtx, module: &Module, scope: ScopeId) {
    for func in &module.functions {
        function_pass_1(ctx, scope, func);
    }
    for func in &module.functions {
        function_pass_2(ctx, scope, func);
    }
}

/// Runs both passes over a module's tasks.
pub fn elaborate_tasks(ctx: &mut ElabCtx, module: &Module, scope: ScopeId) {
    for task in &module.tasks {
        task_pass_1(ctx, scope, task);
    }
    for task in &module.tasks {
        task_pass_2(ctx, scope, task);
    }
}

fn function_pass_1(ctx: &mut ElabCtx, scope: ScopeId, func: &PFunctionDecl) {
    let leaf = ctx.name(func.name).to_string();
    let Some(fscope) = ctx
        .design
        .make_scope(ctx.interner, scope, ScopeKind::Function, &leaf)
    else {
        ctx.emit(errors::error_duplicate_scope(&leaf, func.span));
        return;
    };

    elaborate_wire(ctx, fscope, &func.return_wire);
    for port in &func.ports {
        elaborate_wire(ctx, fscope, port);
    }
    for wire in &func.wires {
        elaborate_wire(ctx, fscope, wire);
    }

    let fpath = ctx.design.scope_path(fscope);
    // ports[0] is the return signal, named after the function itself
    let mut ports: Vec<NetId> = Vec::with_capacity(func.ports.len() + 1);
    match ctx.design.find_signal(ctx.interner, fpath, &leaf) {
        Some(ret) => ports.push(ret),
        None => {
            ctx.emit(errors::internal_missing_signal(&leaf, func.span));
            return;
        }
    }
    for port in &func.ports {
        let pleaf = ctx.name(port.name).to_string();
        match ctx.design.find_signal(ctx.interner, fpath, &pleaf) {
            Some(id) => ports.push(id),
            None => {
                ctx.emit(errors::internal_missing_signal(&pleaf, port.span));
                return;
            }
        }
    }

    ctx.design.functions.insert(
        fpath,
        NetFuncDef {
            path: fpath,
            ports,
            proc: None,
        },
    );
}

fn function_pass_2(ctx: &mut ElabCtx, scope: ScopeId, func: &PFunctionDecl) {
    let leaf = ctx.name(func.name).to_string();
    let fpath = ctx
        .interner
        .join(ctx.design.scope_path(scope), &leaf);
    let Some(fscope) = ctx.design.find_scope(fpath) else {
        // pass 1 failed; already reported
        return;
    };
    if !ctx.design.functions.contains_key(&fpath) {
        return;
    }
    let Some(st) = elaborate_stmt(ctx, fscope, &func.body) else {
        ctx.emit(errors::error_cannot_elaborate(
            "statement in function",
            func.span,
        ));
        return;
    };
    if let Some(def) = ctx.design.functions.get_mut(&fpath) {
        def.proc = Some(st);
    }
}

fn task_pass_1(ctx: &mut ElabCtx, scope: ScopeId, task: &PTaskDecl) {
    let leaf = ctx.name(task.name).to_string();
    let Some(tscope) = ctx
        .design
        .make_scope(ctx.interner, scope, ScopeKind::Task, &leaf)
    else {
        ctx.emit(errors::error_duplicate_scope(&leaf, task.span));
        return;
    };

    for port in &task.ports {
        elaborate_wire(ctx, tscope, port);
    }
    for wire in &task.wires {
        elaborate_wire(ctx, tscope, wire);
    }

    let tpath = ctx.design.scope_path(tscope);
    let mut ports: Vec<NetId> = Vec::with_capacity(task.ports.len());
    for port in &task.ports {
        let pleaf = ctx.name(port.name).to_string();
        match ctx.design.find_signal(ctx.interner, tpath, &pleaf) {
            Some(id) => ports.push(id),
            None => {
                ctx.emit(errors::internal_missing_signal(&pleaf, port.span));
                return;
            }
        }
    }

    ctx.design.tasks.insert(
        tpath,
        NetTaskDef {
            path: tpath,
            ports,
            proc: None,
        },
    );
}

fn task_pass_2(ctx: &mut ElabCtx, scope: ScopeId, task: &PTaskDecl) {
    let leaf = ctx.name(task.name).to_string();
    let tpath = ctx
        .interner
        .join(ctx.design.scope_path(scope), &leaf);
    let Some(tscope) = ctx.design.find_scope(tpath) else {
        return;
    };
    if !ctx.design.tasks.contains_key(&tpath) {
        return;
    }

    let st = match &task.body {
        None => {
            ctx.emit(errors::warn_task_no_statement(task.span));
            silica_netlist::NetProc::empty_block()
        }
        Some(body) => match elaborate_stmt(ctx, tscope, body) {
            Some(st) => st,
            None => {
                ctx.emit(errors::error_cannot_elaborate("statement in task", task.span));
                return;
            }
        },
    };
    if let Some(def) = ctx.design.tasks.get_mut(&tpath) {
        def.proc = Some(st);
    }
}
