//! The flip-flop / RAM-write pattern matcher and rewriter.

use silica_common::Interner;
use silica_netlist::{
    Design, EventEdge, NetExpr, NodeId, NodeKind, PinId, PinOwner, ProcId, NetProc,
};

use crate::expr_synth::synthesize;

/// What the body of a matched process assigns to.
enum Target {
    /// A register assignment node.
    Assign(NodeId),
    /// A memory-word assignment node.
    Mem(NodeId),
}

/// A successfully matched sequential pattern.
struct DffMatch {
    event_node: NodeId,
    edge: EventEdge,
    ce: Option<NetExpr>,
    target: Target,
    rval: NetExpr,
}

/// Attempts to rewrite one `always` process into a flip-flop or RAM
/// write port. Returns `true` when the process was consumed.
pub fn try_rewrite(design: &mut Design, interner: &Interner, pid: ProcId) -> bool {
    let Some(matched) = match_process(design, pid) else {
        return false;
    };

    // Memory writes only synthesize on the rising edge.
    if matches!(matched.target, Target::Mem(_)) && matched.edge != EventEdge::Posedge {
        return false;
    }

    let Some(d) = synthesize(design, interner, &matched.rval) else {
        return false;
    };
    let ce_net = match &matched.ce {
        Some(ce) => {
            let Some(net) = synthesize(design, interner, ce) else {
                return false;
            };
            if design.signals[net].width() != 1 {
                return false;
            }
            Some(net)
        }
        None => None,
    };

    // The generated device must be wide enough to cover the target.
    let needed = match matched.target {
        Target::Assign(assign) => match design.nodes[assign].kind {
            NodeKind::Assign { width, .. } => width,
            _ => return false,
        },
        Target::Mem(assign) => match design.nodes[assign].kind {
            NodeKind::AssignMem { mem, .. } => design.memories[mem].width,
            _ => return false,
        },
    };
    if design.signals[d].width() < needed {
        return false;
    }

    match matched.target {
        Target::Assign(assign) => {
            make_dff(design, &matched, assign, d, ce_net);
            design.delete_process(pid);
            design.delete_node(assign);
            design.delete_node(matched.event_node);
        }
        Target::Mem(assign) => {
            make_ram(design, interner, &matched, assign, d, ce_net);
            design.delete_process(pid);
            design.delete_node(assign);
            design.delete_node(matched.event_node);
        }
    }
    true
}

/// Checks the process against the recognized shapes:
/// a single-edge event wrapping a bare assignment, or an else-less
/// conditional whose consequent is a bare assignment.
fn match_process(design: &Design, pid: ProcId) -> Option<DffMatch> {
    let top = design.processes.try_get(pid)?;

    let NetProc::PEvent { sources, stmt } = &top.statement else {
        return None;
    };
    if sources.len() != 1 {
        return None;
    }
    let event_node = sources[0];
    let NodeKind::Event { edge } = design.nodes[event_node].kind else {
        return None;
    };
    if edge != EventEdge::Posedge && edge != EventEdge::Negedge {
        return None;
    }

    let mut ce = None;
    let mut body = stmt.as_deref()?;
    if let NetProc::Condit {
        cond,
        if_stmt,
        else_stmt,
    } = body
    {
        if else_stmt.is_some() {
            return None;
        }
        ce = Some(cond.clone());
        body = if_stmt.as_deref()?;
    }

    let target = match body {
        NetProc::Assign(node) => {
            let NodeKind::Assign { mux, rval, .. } = &design.nodes[*node].kind else {
                return None;
            };
            if mux.is_some() {
                return None;
            }
            return Some(DffMatch {
                event_node,
                edge,
                ce,
                target: Target::Assign(*node),
                rval: rval.clone(),
            });
        }
        NetProc::AssignMem(node) => {
            let NodeKind::AssignMem { rval, .. } = &design.nodes[*node].kind else {
                return None;
            };
            Some(DffMatch {
                event_node,
                edge,
                ce,
                target: Target::Mem(*node),
                rval: rval.clone(),
            })
        }
        _ => None,
    };
    target
}

/// Collects the signal pins sharing a nexus with `pin`.
fn signal_pins_of(design: &Design, pin: PinId) -> Vec<PinId> {
    design
        .links
        .nexus(pin)
        .into_iter()
        .filter(|&p| matches!(design.links.owner(p), PinOwner::Signal { .. }))
        .collect()
}

fn make_dff(
    design: &mut Design,
    matched: &DffMatch,
    assign: NodeId,
    d: silica_netlist::NetId,
    ce_net: Option<silica_netlist::NetId>,
) {
    let NodeKind::Assign { width, .. } = design.nodes[assign].kind else {
        unreachable!("matched node is an assignment");
    };

    let name = design.nodes[assign].name;
    let span = design.nodes[assign].span;
    let ff = design.add_node(name, NodeKind::Ff { width }, 0, span);

    for idx in 0..width {
        let data = design.nodes[ff].ff_data(idx);
        let dp = design.signals[d].pin(idx);
        design.links.connect(data, dp);

        // Route Q around the assignment node, which is about to go away.
        let q = design.nodes[ff].ff_q(idx);
        for target in signal_pins_of(design, design.nodes[assign].pin(idx)) {
            design.links.connect(q, target);
        }
    }

    let clock = design.nodes[ff].ff_clock();
    for target in signal_pins_of(design, design.nodes[matched.event_node].pin(0)) {
        design.links.connect(clock, target);
    }

    if let Some(ce) = ce_net {
        let enable = design.nodes[ff].ff_enable();
        let cp = design.signals[ce].pin(0);
        design.links.connect(enable, cp);
    }

    design.nodes[ff]
        .attributes
        .insert("LPM_FFType".into(), "DFF".into());
    if matched.edge == EventEdge::Negedge {
        design.nodes[ff]
            .attributes
            .insert("Clock:LPM_Polarity".into(), "INVERT".into());
    }
}

fn make_ram(
    design: &mut Design,
    interner: &Interner,
    matched: &DffMatch,
    assign: NodeId,
    d: silica_netlist::NetId,
    ce_net: Option<silica_netlist::NetId>,
) {
    let NodeKind::AssignMem { mem, index, .. } = design.nodes[assign].kind else {
        unreachable!("matched node is a memory assignment");
    };
    let span = design.nodes[assign].span;
    let awidth = design.signals[index].width();
    let width = design.memories[mem].width;

    let name = design.local_symbol(interner, design.memories[mem].name);
    let ram = design.add_node(
        name,
        NodeKind::RamDq { mem, awidth, width },
        0,
        span,
    );

    for idx in 0..awidth {
        let ap = design.nodes[ram].ram_address(idx);
        let sp = design.signals[index].pin(idx);
        design.links.connect(ap, sp);
    }
    for idx in 0..width {
        let dp = design.nodes[ram].ram_data(idx);
        let sp = design.signals[d].pin(idx);
        design.links.connect(dp, sp);
    }
    if let Some(ce) = ce_net {
        let we = design.nodes[ram].ram_we();
        let cp = design.signals[ce].pin(0);
        design.links.connect(we, cp);
    }
    let inclock = design.nodes[ram].ram_inclock();
    for target in signal_pins_of(design, design.nodes[matched.event_node].pin(0)) {
        design.links.connect(inclock, target);
    }

    // Sibling read ports on the same memory share this port's clock.
    let partners: Vec<NodeId> = design
        .nodes
        .iter()
        .filter(|&(id, node)| {
            id != ram && matches!(node.kind, NodeKind::RamDq { mem: m, .. } if m == mem)
        })
        .map(|(id, _)| id)
        .collect();
    for partner in partners {
        let pp = design.nodes[partner].ram_inclock();
        design.links.connect(inclock, pp);
    }
}
