//! Diagnostic codes and helper functions for elaboration messages.
//!
//! Error codes `E100`--`E120` cover structural and type errors. Warning
//! codes `W200`--`W202` cover non-fatal issues. Sorry codes `S300`--`S305`
//! mark recognized but deliberately unimplemented constructs. Internal
//! codes `I900`--`I902` indicate elaborator bugs.

use silica_diagnostics::{Category, Diagnostic, DiagnosticCode};
use silica_source::Span;

/// Constant expression could not be evaluated.
pub const E100: DiagnosticCode = DiagnosticCode::new(Category::Error, 100);

/// Inconsistent widths declared for one signal.
pub const E101: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);

/// Unknown module or primitive type in an instantiation.
pub const E102: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);

/// Instance or scope name already used in the enclosing context.
pub const E103: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);

/// Wrong number of positional port connections.
pub const E104: DiagnosticCode = DiagnosticCode::new(Category::Error, 104);

/// Named port binding problem (unknown name, or bound twice).
pub const E105: DiagnosticCode = DiagnosticCode::new(Category::Error, 105);

/// Reference to a signal that cannot be resolved in the scope chain.
pub const E106: DiagnosticCode = DiagnosticCode::new(Category::Error, 106);

/// The l-value of a procedural assignment is not a register.
pub const E107: DiagnosticCode = DiagnosticCode::new(Category::Error, 107);

/// Gate bank count does not match a connected net's width.
pub const E108: DiagnosticCode = DiagnosticCode::new(Category::Error, 108);

/// Enable of an unknown user task.
pub const E109: DiagnosticCode = DiagnosticCode::new(Category::Error, 109);

/// Argument count mismatch in a task or function call.
pub const E110: DiagnosticCode = DiagnosticCode::new(Category::Error, 110);

/// An expression could not be elaborated in this context.
pub const E111: DiagnosticCode = DiagnosticCode::new(Category::Error, 111);

/// Instance port width does not match the connected expression.
pub const E112: DiagnosticCode = DiagnosticCode::new(Category::Error, 112);

/// A parameter expression could not be reduced to a constant.
pub const E113: DiagnosticCode = DiagnosticCode::new(Category::Error, 113);

/// A module instantiation is missing its instance name.
pub const E114: DiagnosticCode = DiagnosticCode::new(Category::Error, 114);

/// Non-blocking assignment to a memory word (cannot be executed).
pub const E115: DiagnosticCode = DiagnosticCode::new(Category::Error, 115);

/// Behavioral process failed to elaborate.
pub const E116: DiagnosticCode = DiagnosticCode::new(Category::Error, 116);

/// Call to an unknown user function.
pub const E117: DiagnosticCode = DiagnosticCode::new(Category::Error, 117);

/// Task has no statement.
pub const W200: DiagnosticCode = DiagnosticCode::new(Category::Warning, 200);

/// Loop condition is a constant expression.
pub const W201: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

/// Module instantiation arrays.
pub const S300: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 300);

/// Non-constant delay expression.
pub const S301: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 301);

/// Repeat concatenation as an l-value net.
pub const S302: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 302);

/// Continuous-assign l-value wider than the r-value.
pub const S303: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 303);

/// Non-constant bit select on a non-blocking multi-bit l-value.
pub const S304: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 304);

/// Operator not supported in a structural (net) context.
pub const S305: DiagnosticCode = DiagnosticCode::new(Category::Sorry, 305);

/// Unreachable parse-tree shape.
pub const I900: DiagnosticCode = DiagnosticCode::new(Category::Internal, 900);

/// A signal guaranteed by an earlier pass is missing.
pub const I901: DiagnosticCode = DiagnosticCode::new(Category::Internal, 901);

/// Expression too complicated for net elaboration.
pub const I902: DiagnosticCode = DiagnosticCode::new(Category::Internal, 902);

/// A constant expression did not evaluate.
pub fn error_not_constant(what: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E100,
        format!("Unable to evaluate constant expression for {what}."),
        span,
    )
}

/// Two range declarations of one signal disagree.
pub fn error_inconsistent_width(
    name: &str,
    got: (i64, i64),
    first: (i64, i64),
    span: Span,
) -> Diagnostic {
    Diagnostic::error(
        E101,
        format!(
            "Inconsistent width, [{}:{}] vs. [{}:{}] for signal ``{name}''",
            got.0, got.1, first.0, first.1
        ),
        span,
    )
}

/// The instantiated type is neither a module nor a primitive.
pub fn error_unknown_module(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E102, format!("Unknown module: {name}"), span)
}

/// A scope with this name already exists in the enclosing context.
pub fn error_duplicate_scope(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E103,
        format!("Instance/Scope name {name} already used in this context."),
        span,
    )
}

/// Positional connection count differs from the port count.
pub fn error_wrong_port_count(expected: usize, got: usize, span: Span) -> Diagnostic {
    Diagnostic::error(
        E104,
        format!("Wrong number of parameters. Expecting {expected}, got {got}."),
        span,
    )
}

/// A named binding names a port the module does not have.
pub fn error_not_a_port(port: &str, module: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E105,
        format!("port ``{port}'' is not a port of {module}."),
        span,
    )
}

/// A named binding repeats a port.
pub fn error_port_bound_twice(port: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E105, format!("port ``{port}'' already bound."), span)
}

/// A signal reference did not resolve.
pub fn error_unknown_signal(name: &str, path: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E106,
        format!("Could not match signal ``{name}'' in ``{path}''"),
        span,
    )
}

/// A procedural assignment targets something that is not a register.
pub fn error_not_a_register(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E107, format!("{name} is not a register."), span)
}

/// A gate bank's width does not divide into a connected net.
pub fn error_gate_count_mismatch(count: u32, width: u32, pin: u32, span: Span) -> Diagnostic {
    Diagnostic::error(
        E108,
        format!("Gate count of {count} does not match net width of {width} at pin {pin}."),
        span,
    )
}

/// A task enable names an unknown task.
pub fn error_unknown_task(path: &str, name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E109,
        format!("Enable of unknown task ``{path}.{name}''."),
        span,
    )
}

/// A function call names an unknown function.
pub fn error_unknown_function(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E117, format!("Call to unknown function ``{name}''."), span)
}

/// A task or function call has the wrong argument count.
pub fn error_call_arity(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E110,
        format!("Port count mismatch in call to ``{name}''."),
        span,
    )
}

/// An expression failed to elaborate in this context.
pub fn error_cannot_elaborate(what: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E111, format!("Unable to elaborate {what}."), span)
}

/// An instance port's pin count disagrees with the bound expression.
pub fn error_port_width(port: usize, module: &str, expected: u32, got: u32, span: Span) -> Diagnostic {
    Diagnostic::error(
        E112,
        format!("Port {port} of {module} expects {expected} pins, got {got}."),
        span,
    )
}

/// A parameter never reduced to a constant.
pub fn error_param_not_const(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E113,
        format!("Unable to evaluate parameter ``{name}''."),
        span,
    )
}

/// An instantiation has no instance name.
pub fn error_missing_instance_name(type_name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E114,
        format!("Instantiation of {type_name} requires an instance name."),
        span,
    )
}

/// A non-blocking assignment targets a memory word.
pub fn error_nb_memory_assign(span: Span) -> Diagnostic {
    Diagnostic::error(
        E115,
        "Non-blocking assignment to a memory is not supported.",
        span,
    )
    .with_note("the assignment was lowered, but the design cannot be executed")
}

/// A behavioral process failed to elaborate.
pub fn error_process_failed(span: Span) -> Diagnostic {
    Diagnostic::error(E116, "Elaboration failed for this process.", span)
}

/// A task definition has no body.
pub fn warn_task_no_statement(span: Span) -> Diagnostic {
    Diagnostic::warning(W200, "task has no statement.", span)
}

/// A loop condition folded to a constant.
pub fn warn_constant_condition(span: Span) -> Diagnostic {
    Diagnostic::warning(W201, "condition expression is constant.", span)
}

/// Instantiation arrays are recognized but unimplemented.
pub fn sorry_instance_array(span: Span) -> Diagnostic {
    Diagnostic::sorry(
        S300,
        "Module instantiation arrays are not yet supported.",
        span,
    )
}

/// Delay expressions must be constant.
pub fn sorry_nonconstant_delay(span: Span) -> Diagnostic {
    Diagnostic::sorry(S301, "delay expression must be constant.", span)
}

/// Repeat concatenation cannot be an l-value net.
pub fn sorry_repeat_lnet(span: Span) -> Diagnostic {
    Diagnostic::sorry(
        S302,
        "I do not know how to elaborate repeat concatenation nets.",
        span,
    )
}

/// Continuous-assign l-value wider than the r-value.
pub fn sorry_lval_wider(lwid: u32, rwid: u32, span: Span) -> Diagnostic {
    Diagnostic::sorry(S303, format!("lval width ({lwid}) > rval width ({rwid})."), span)
}

/// Non-constant bit select on a non-blocking multi-bit l-value.
pub fn sorry_nb_bit_select(span: Span) -> Diagnostic {
    Diagnostic::sorry(
        S304,
        "non-constant bit select on a multi-bit non-blocking l-value.",
        span,
    )
}

/// The operator has no structural lowering.
pub fn sorry_structural_op(what: &str, span: Span) -> Diagnostic {
    Diagnostic::sorry(
        S305,
        format!("{what} is not supported in a structural context."),
        span,
    )
}

/// The parse tree contains a shape earlier passes should have rejected.
pub fn internal_unreachable(what: &str, span: Span) -> Diagnostic {
    Diagnostic::internal(I900, what.to_string(), span)
}

/// A signal promised by an earlier pass is gone.
pub fn internal_missing_signal(name: &str, span: Span) -> Diagnostic {
    Diagnostic::internal(I901, format!("missing signal ``{name}''."), span)
}

/// Net elaboration gave up on an expression it should handle.
pub fn internal_expression_too_complicated(span: Span) -> Diagnostic {
    Diagnostic::internal(I902, "Expression too complicated for elaboration.", span)
}
