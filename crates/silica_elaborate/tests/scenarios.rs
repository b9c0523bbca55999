//! End-to-end elaboration scenarios over hand-built parse trees.

use std::collections::HashMap;

use silica_common::{Interner, LogicVec};
use silica_diagnostics::DiagnosticSink;
use silica_elaborate::elaborate;
use silica_netlist::{Design, NetExpr, NodeKind};
use silica_pform::{
    GateKind, Module, ParamDecl, ParamOverrides, PExpr, PGAssign, PGate, PGBuiltin, PGInstance,
    PinBinding, PortDirection, PPort, PWire, UnaryOp, WireKind,
};
use silica_source::Span;

fn num(v: u64, w: u32) -> PExpr {
    PExpr::number(LogicVec::from_u64(v, w), Span::DUMMY)
}

fn ranged_wire(
    interner: &Interner,
    leaf: &str,
    kind: WireKind,
    dir: PortDirection,
    msb: &PExpr,
    lsb: &PExpr,
) -> PWire {
    let mut w = PWire::scalar(interner.get_or_intern(leaf), kind, dir, Span::DUMMY);
    w.ranges.push((msb.clone(), lsb.clone()));
    w
}

fn port(interner: &Interner, leaf: &str) -> PPort {
    let name = interner.get_or_intern(leaf);
    PPort {
        name: Some(name),
        wires: vec![name],
        span: Span::DUMMY,
    }
}

fn run(
    modules: Vec<Module>,
    root: &str,
    interner: &Interner,
) -> (Option<Design>, DiagnosticSink) {
    let map: HashMap<_, _> = modules.into_iter().map(|m| (m.name, m)).collect();
    let primitives = HashMap::new();
    let sink = DiagnosticSink::new();
    let design = elaborate(
        &map,
        &primitives,
        interner.get_or_intern(root),
        interner,
        &sink,
    );
    (design, sink)
}

/// `module m(output [3:0] y, input [3:0] a); assign y = a; endmodule`
fn scenario_s1_module(interner: &Interner) -> Module {
    let mut m = Module::new(interner.get_or_intern("m"), Span::DUMMY);
    m.ports.push(port(interner, "y"));
    m.ports.push(port(interner, "a"));
    m.wires.push(ranged_wire(
        interner,
        "y",
        WireKind::Wire,
        PortDirection::Output,
        &num(3, 32),
        &num(0, 32),
    ));
    m.wires.push(ranged_wire(
        interner,
        "a",
        WireKind::Wire,
        PortDirection::Input,
        &num(3, 32),
        &num(0, 32),
    ));
    m.gates.push(PGate::Assign(PGAssign {
        delays: vec![],
        lval: PExpr::ident(interner.get_or_intern("y"), Span::DUMMY),
        rval: PExpr::ident(interner.get_or_intern("a"), Span::DUMMY),
        span: Span::DUMMY,
    }));
    m
}

#[test]
fn s1_simple_continuous_assign() {
    let interner = Interner::new();
    let (design, _sink) = run(vec![scenario_s1_module(&interner)], "m", &interner);
    let design = design.expect("design");
    assert_eq!(design.errors, 0);

    let root = design.root_scope().unwrap();
    let path = design.scope_path(root);
    assert_eq!(interner.resolve(path), "m");

    let y = design.find_signal(&interner, path, "y").expect("m.y");
    let a = design.find_signal(&interner, path, "a").expect("m.a");
    assert_eq!(design.signals[y].width(), 4);
    assert_eq!(design.signals[a].width(), 4);
    for i in 0..4 {
        assert!(design
            .links
            .is_connected(design.signals[y].pin(i), design.signals[a].pin(i)));
    }
}

#[test]
fn s1_nexus_name_is_deterministic_across_pins() {
    let interner = Interner::new();
    let (design, _sink) = run(vec![scenario_s1_module(&interner)], "m", &interner);
    let design = design.unwrap();
    let root = design.root_scope().unwrap();
    let path = design.scope_path(root);
    let y = design.find_signal(&interner, path, "y").unwrap();
    let a = design.find_signal(&interner, path, "a").unwrap();
    for i in 0..4 {
        let from_y = design.nexus_name(&interner, design.signals[y].pin(i)).unwrap();
        let from_a = design.nexus_name(&interner, design.signals[a].pin(i)).unwrap();
        assert_eq!(from_y, from_a);
        // lexicographically least non-local signal wins
        assert_eq!(from_y, format!("m.a<{i}>"));
    }
}

/// `module inv #(parameter W=1)(output [W-1:0] y, input [W-1:0] a);
/// assign y = ~a; endmodule`
fn inv_module(interner: &Interner) -> Module {
    let w = interner.get_or_intern("W");
    let mut m = Module::new(interner.get_or_intern("inv"), Span::DUMMY);
    m.params.push(ParamDecl {
        name: w,
        default: num(1, 32),
        span: Span::DUMMY,
    });
    let w_minus_1 = PExpr::Binary {
        op: silica_pform::BinaryOp::Sub,
        left: Box::new(PExpr::ident(w, Span::DUMMY)),
        right: Box::new(num(1, 32)),
        span: Span::DUMMY,
    };
    m.ports.push(port(interner, "y"));
    m.ports.push(port(interner, "a"));
    m.wires.push(ranged_wire(
        interner,
        "y",
        WireKind::Wire,
        PortDirection::Output,
        &w_minus_1,
        &num(0, 32),
    ));
    m.wires.push(ranged_wire(
        interner,
        "a",
        WireKind::Wire,
        PortDirection::Input,
        &w_minus_1,
        &num(0, 32),
    ));
    m.gates.push(PGate::Assign(PGAssign {
        delays: vec![],
        lval: PExpr::ident(interner.get_or_intern("y"), Span::DUMMY),
        rval: PExpr::Unary {
            op: UnaryOp::BitNot,
            operand: Box::new(PExpr::ident(interner.get_or_intern("a"), Span::DUMMY)),
            span: Span::DUMMY,
        },
        span: Span::DUMMY,
    }));
    m
}

/// `module top; wire [7:0] x, z; inv #(8) u(z, x); endmodule`
fn top_module(interner: &Interner) -> Module {
    let mut top = Module::new(interner.get_or_intern("top"), Span::DUMMY);
    for leaf in ["x", "z"] {
        top.wires.push(ranged_wire(
            interner,
            leaf,
            WireKind::Wire,
            PortDirection::NotAPort,
            &num(7, 32),
            &num(0, 32),
        ));
    }
    top.gates.push(PGate::Instance(PGInstance {
        type_name: interner.get_or_intern("inv"),
        name: Some(interner.get_or_intern("u")),
        range: None,
        overrides: Some(ParamOverrides::Positional(vec![num(8, 32)])),
        pins: PinBinding::Positional(vec![
            Some(PExpr::ident(interner.get_or_intern("z"), Span::DUMMY)),
            Some(PExpr::ident(interner.get_or_intern("x"), Span::DUMMY)),
        ]),
        attributes: Default::default(),
        span: Span::DUMMY,
    }));
    top
}

#[test]
fn s2_hierarchy_and_parameter_override() {
    let interner = Interner::new();
    let (design, _sink) = run(
        vec![inv_module(&interner), top_module(&interner)],
        "top",
        &interner,
    );
    let design = design.expect("design");
    assert_eq!(design.errors, 0);

    let top_path = interner.get_or_intern("top");
    let u_path = interner.get_or_intern("top.u");
    assert!(design.find_scope(top_path).is_some());
    assert!(design.find_scope(u_path).is_some());

    // the override reached the child: W = 8, so y is 8 bits wide
    let y = design.find_signal(&interner, u_path, "y").expect("top.u.y");
    assert_eq!(design.signals[y].width(), 8);
    match design.find_parameter(&interner, u_path, "W") {
        Some(NetExpr::Const(v)) => assert_eq!(v.as_long(), Some(8)),
        other => panic!("expected constant parameter, got {other:?}"),
    }

    // eight inverters, named from one local symbol with bit suffixes
    let not_gates: Vec<&str> = design
        .nodes
        .values()
        .filter(|n| {
            matches!(
                n.kind,
                NodeKind::Logic {
                    op: silica_netlist::LogicOp::Not,
                    ..
                }
            )
        })
        .map(|n| interner.resolve(n.name))
        .collect();
    assert_eq!(not_gates.len(), 8);
    for (i, name) in not_gates.iter().enumerate() {
        assert!(name.starts_with("top.u._L"), "unexpected name {name}");
        assert!(name.ends_with(&format!("<{i}>")), "unexpected name {name}");
    }

    // port splice kept bit order: z[i] is u's y[i]
    let z = design.find_signal(&interner, top_path, "z").unwrap();
    let x = design.find_signal(&interner, top_path, "x").unwrap();
    let a = design.find_signal(&interner, u_path, "a").unwrap();
    for i in 0..8 {
        assert!(design
            .links
            .is_connected(design.signals[z].pin(i), design.signals[y].pin(i)));
        assert!(design
            .links
            .is_connected(design.signals[x].pin(i), design.signals[a].pin(i)));
    }
}

#[test]
fn s2_scope_paths_are_unique() {
    let interner = Interner::new();
    let (design, _sink) = run(
        vec![inv_module(&interner), top_module(&interner)],
        "top",
        &interner,
    );
    let design = design.unwrap();
    let mut paths: Vec<&str> = design
        .scopes
        .values()
        .map(|s| interner.resolve(s.path))
        .collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
}

#[test]
fn s2_parameter_closure() {
    let interner = Interner::new();
    let (design, _sink) = run(
        vec![inv_module(&interner), top_module(&interner)],
        "top",
        &interner,
    );
    let design = design.unwrap();
    assert!(!design.parameters.is_empty());
    for value in design.parameters.values() {
        assert!(matches!(value, NetExpr::Const(_)));
    }
}

#[test]
fn s2_elaboration_is_idempotent() {
    let interner = Interner::new();
    let (first, _) = run(
        vec![inv_module(&interner), top_module(&interner)],
        "top",
        &interner,
    );
    let (second, _) = run(
        vec![inv_module(&interner), top_module(&interner)],
        "top",
        &interner,
    );
    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(
        first.content_hash(&interner),
        second.content_hash(&interner)
    );
}

#[test]
fn s5_duplicate_instance_name() {
    let interner = Interner::new();
    let sub = Module::new(interner.get_or_intern("sub"), Span::DUMMY);
    let mut top = Module::new(interner.get_or_intern("top"), Span::DUMMY);
    for _ in 0..2 {
        top.gates.push(PGate::Instance(PGInstance {
            type_name: interner.get_or_intern("sub"),
            name: Some(interner.get_or_intern("u1")),
            range: None,
            overrides: None,
            pins: PinBinding::Positional(vec![]),
            attributes: Default::default(),
            span: Span::DUMMY,
        }));
    }
    let (design, sink) = run(vec![sub, top], "top", &interner);
    let design = design.expect("elaboration continues after the error");
    assert_eq!(design.errors, 1);
    let messages: Vec<String> = sink.diagnostics().iter().map(|d| d.message.clone()).collect();
    assert!(messages
        .iter()
        .any(|m| m == "Instance/Scope name u1 already used in this context."));
    // the first u1 exists, and only once
    assert!(design
        .find_scope(interner.get_or_intern("top.u1"))
        .is_some());
}

#[test]
fn missing_root_module_returns_none() {
    let interner = Interner::new();
    let (design, sink) = run(vec![], "nowhere", &interner);
    assert!(design.is_none());
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn builtin_gate_bank_in_module_context() {
    // module m(output [1:0] y, input [1:0] a); not n[1:0] (y, a); endmodule
    let interner = Interner::new();
    let mut m = Module::new(interner.get_or_intern("m"), Span::DUMMY);
    m.ports.push(port(&interner, "y"));
    m.ports.push(port(&interner, "a"));
    m.wires.push(ranged_wire(
        &interner,
        "y",
        WireKind::Wire,
        PortDirection::Output,
        &num(1, 32),
        &num(0, 32),
    ));
    m.wires.push(ranged_wire(
        &interner,
        "a",
        WireKind::Wire,
        PortDirection::Input,
        &num(1, 32),
        &num(0, 32),
    ));
    m.gates.push(PGate::Builtin(PGBuiltin {
        kind: GateKind::Not,
        name: Some(interner.get_or_intern("n")),
        range: Some((num(1, 32), num(0, 32))),
        delays: vec![],
        pins: vec![
            PExpr::ident(interner.get_or_intern("y"), Span::DUMMY),
            PExpr::ident(interner.get_or_intern("a"), Span::DUMMY),
        ],
        attributes: Default::default(),
        span: Span::DUMMY,
    }));
    let (design, _sink) = run(vec![m], "m", &interner);
    let design = design.unwrap();
    assert_eq!(design.errors, 0);
    let names: Vec<&str> = design
        .nodes
        .values()
        .map(|n| interner.resolve(n.name))
        .collect();
    assert!(names.contains(&"m.n<0>"));
    assert!(names.contains(&"m.n<1>"));
}
