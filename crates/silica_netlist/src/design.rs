//! The top-level design container.

use crate::arena::Arena;
use crate::expr::NetExpr;
use crate::ids::{MemoryId, NetId, NodeId, PinId, ProcId, ScopeId};
use crate::link::{LinkGraph, PinOwner};
use crate::memory::NetMemory;
use crate::net::{NetKind, NetNet, PortClass};
use crate::node::{NetNode, NodeKind};
use crate::proc::NetProcTop;
use crate::scope::{NetScope, ScopeKind};
use silica_common::{ContentHash, ContentHasher, Ident, InternalError, Interner, Logic};
use silica_source::Span;
use std::collections::{BTreeMap, HashMap};

/// An installed user task definition.
///
/// Pass 1 of task elaboration installs the path and port signals; pass 2
/// fills in the body. Between the passes, calls may already resolve the
/// definition, which is what makes recursion work.
#[derive(Debug, Clone)]
pub struct NetTaskDef {
    /// The fully qualified task path.
    pub path: Ident,
    /// The port signals in declaration order.
    pub ports: Vec<NetId>,
    /// The lowered body; `None` until pass 2 completes.
    pub proc: Option<crate::proc::NetProc>,
}

/// An installed user function definition.
///
/// `ports[0]` is the return-value signal; the declared ports follow.
#[derive(Debug, Clone)]
pub struct NetFuncDef {
    /// The fully qualified function path.
    pub path: Ident,
    /// The return signal followed by the declared port signals.
    pub ports: Vec<NetId>,
    /// The lowered body; `None` until pass 2 completes.
    pub proc: Option<crate::proc::NetProc>,
}

/// A complete elaborated design.
///
/// The design exclusively owns its scopes, signals, memories, nodes,
/// processes, parameter values, task/function definitions, and the pin
/// connection graph.
#[derive(Debug, Default)]
pub struct Design {
    /// The scope tree.
    pub scopes: Arena<ScopeId, NetScope>,
    scope_by_path: HashMap<Ident, ScopeId>,
    root: Option<ScopeId>,
    /// All signals.
    pub signals: Arena<NetId, NetNet>,
    signal_by_name: HashMap<Ident, NetId>,
    /// All memories.
    pub memories: Arena<MemoryId, NetMemory>,
    memory_by_name: HashMap<Ident, MemoryId>,
    /// All structural nodes.
    pub nodes: Arena<NodeId, NetNode>,
    /// All behavioral processes.
    pub processes: Arena<ProcId, NetProcTop>,
    /// Parameter values keyed by fully qualified name.
    pub parameters: BTreeMap<Ident, NetExpr>,
    /// User task definitions keyed by fully qualified path.
    pub tasks: BTreeMap<Ident, NetTaskDef>,
    /// User function definitions keyed by fully qualified path.
    pub functions: BTreeMap<Ident, NetFuncDef>,
    /// The pin connection graph.
    pub links: LinkGraph,
    lcounter: u32,
    /// The number of errors reported while building this design.
    pub errors: u32,
}

impl Design {
    /// Creates a new empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the root scope, named after the root module.
    pub fn make_root_scope(&mut self, interner: &Interner, name: &str) -> ScopeId {
        let path = interner.get_or_intern(name);
        let id = self.scopes.alloc(NetScope {
            parent: None,
            kind: ScopeKind::Root,
            name: path,
            path,
        });
        self.scope_by_path.insert(path, id);
        self.root = Some(id);
        id
    }

    /// Creates a child scope under `parent`.
    ///
    /// Returns `None` if a scope with the resulting path already exists
    /// (scope paths are unique across the design).
    pub fn make_scope(
        &mut self,
        interner: &Interner,
        parent: ScopeId,
        kind: ScopeKind,
        leaf: &str,
    ) -> Option<ScopeId> {
        let path = interner.join(self.scopes[parent].path, leaf);
        if self.scope_by_path.contains_key(&path) {
            return None;
        }
        let id = self.scopes.alloc(NetScope {
            parent: Some(parent),
            kind,
            name: interner.get_or_intern(leaf),
            path,
        });
        self.scope_by_path.insert(path, id);
        Some(id)
    }

    /// Returns the root scope, if one was created.
    pub fn root_scope(&self) -> Option<ScopeId> {
        self.root
    }

    /// Finds a scope by fully qualified path.
    pub fn find_scope(&self, path: Ident) -> Option<ScopeId> {
        self.scope_by_path.get(&path).copied()
    }

    /// Returns the fully qualified path of a scope.
    pub fn scope_path(&self, scope: ScopeId) -> Ident {
        self.scopes[scope].path
    }

    /// Generates a fresh compiler-local symbol `path._L<counter>`.
    ///
    /// The counter increases monotonically per design.
    pub fn local_symbol(&mut self, interner: &Interner, path: Ident) -> Ident {
        let name = format!("_L{}", self.lcounter);
        self.lcounter += 1;
        interner.join(path, &name)
    }

    /// Creates a signal with one pin per bit and registers it by name.
    ///
    /// `init_bit` seeds every bit of the initial value (`x` for reg-like
    /// signals, `z` for wires).
    #[allow(clippy::too_many_arguments)]
    pub fn add_signal(
        &mut self,
        scope: ScopeId,
        name: Ident,
        kind: NetKind,
        port: PortClass,
        msb: i64,
        lsb: i64,
        init_bit: Logic,
        local: bool,
        span: Span,
    ) -> NetId {
        let width = (msb - lsb).unsigned_abs() as u32 + 1;
        let id = self.signals.alloc(NetNet {
            name,
            scope,
            kind,
            port,
            msb,
            lsb,
            pins: Vec::new(),
            init: vec![init_bit; width as usize],
            attributes: BTreeMap::new(),
            local,
            span,
        });
        let pins: Vec<PinId> = (0..width)
            .map(|bit| self.links.alloc_pin(PinOwner::Signal { net: id, bit }))
            .collect();
        self.signals[id].pins = pins;
        self.signal_by_name.insert(name, id);
        id
    }

    /// Finds a signal by leaf name, searching `path` and then each
    /// enclosing scope toward the root.
    pub fn find_signal(&self, interner: &Interner, path: Ident, leaf: &str) -> Option<NetId> {
        let mut cur = Some(path);
        while let Some(p) = cur {
            let full = interner.join(p, leaf);
            if let Some(&id) = self.signal_by_name.get(&full) {
                return Some(id);
            }
            cur = interner.parent(p);
        }
        None
    }

    /// Registers a memory by name.
    pub fn add_memory(&mut self, mem: NetMemory) -> MemoryId {
        let name = mem.name;
        let id = self.memories.alloc(mem);
        self.memory_by_name.insert(name, id);
        id
    }

    /// Finds a memory by leaf name with the same scope-chain search as
    /// [`find_signal`](Self::find_signal).
    pub fn find_memory(&self, interner: &Interner, path: Ident, leaf: &str) -> Option<MemoryId> {
        let mut cur = Some(path);
        while let Some(p) = cur {
            let full = interner.join(p, leaf);
            if let Some(&id) = self.memory_by_name.get(&full) {
                return Some(id);
            }
            cur = interner.parent(p);
        }
        None
    }

    /// Sets (or replaces) a parameter value by fully qualified name.
    pub fn set_parameter(&mut self, name: Ident, expr: NetExpr) {
        self.parameters.insert(name, expr);
    }

    /// Finds a parameter by leaf name with the scope-chain search.
    pub fn find_parameter(&self, interner: &Interner, path: Ident, leaf: &str) -> Option<&NetExpr> {
        let mut cur = Some(path);
        while let Some(p) = cur {
            let full = interner.join(p, leaf);
            if let Some(expr) = self.parameters.get(&full) {
                return Some(expr);
            }
            cur = interner.parent(p);
        }
        None
    }

    /// Creates a structural node, allocating its pins.
    ///
    /// `explicit_pins` is consulted only for kinds whose pin count is not
    /// implied by the payload (gates, UDPs, event sources).
    pub fn add_node(
        &mut self,
        name: Ident,
        kind: NodeKind,
        explicit_pins: u32,
        span: Span,
    ) -> NodeId {
        let npins = NetNode::pins_for(&kind, explicit_pins);
        let id = self.nodes.alloc(NetNode {
            name,
            pins: Vec::new(),
            attributes: BTreeMap::new(),
            kind,
            span,
        });
        let pins: Vec<PinId> = (0..npins)
            .map(|pin| self.links.alloc_pin(PinOwner::Node { node: id, pin }))
            .collect();
        self.nodes[id].pins = pins;
        id
    }

    /// Deletes a node, releasing its pins from the connection graph.
    pub fn delete_node(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(id) {
            self.links.release_pins(&node.pins);
        }
    }

    /// Adds a behavioral process.
    pub fn add_process(&mut self, top: NetProcTop) -> ProcId {
        self.processes.alloc(top)
    }

    /// Deletes a behavioral process. The caller is responsible for
    /// deleting any nodes the process tree owned.
    pub fn delete_process(&mut self, id: ProcId) -> Option<NetProcTop> {
        self.processes.remove(id)
    }

    /// Resolves the canonical name of the nexus containing `pin`.
    ///
    /// Preference order: signal pins over node pins, multi-bit signals
    /// over single-bit signals, non-local signals over local ones, then
    /// the lexicographically least name. When the chosen signal is wider
    /// than one bit, `<bit>` is appended to name the specific bit.
    ///
    /// Every pin of a nexus resolves to the same string.
    pub fn nexus_name(&self, interner: &Interner, pin: PinId) -> Result<String, InternalError> {
        let mut best: Option<(&NetNet, u32)> = None;
        for member in self.links.nexus(pin) {
            let PinOwner::Signal { net, bit } = self.links.owner(member) else {
                continue;
            };
            let sig = &self.signals[net];
            let better = match best {
                None => true,
                Some((cur, _)) => {
                    let key = |s: &NetNet| {
                        (
                            s.width() == 1,
                            s.local,
                            interner.resolve(s.name).to_string(),
                        )
                    };
                    key(sig) < key(cur)
                }
            };
            if better {
                best = Some((sig, bit));
            }
        }

        let Some((sig, bit)) = best else {
            let owner = self.links.owner(pin);
            return Err(InternalError::new(format!(
                "No signal for nexus of {owner:?}"
            )));
        };
        let name = interner.resolve(sig.name);
        if sig.width() > 1 {
            Ok(format!("{name}<{bit}>"))
        } else {
            Ok(name.to_string())
        }
    }

    /// Digests the design structure into a content hash.
    ///
    /// Two elaborations of the same input produce the same hash; the hash
    /// covers names, kinds, widths, parameter values, and node/process
    /// inventory.
    pub fn content_hash(&self, interner: &Interner) -> ContentHash {
        let mut h = ContentHasher::new();

        for (_, scope) in self.scopes.iter() {
            h.write_tag(1);
            h.write_str(interner.resolve(scope.path));
            h.write_tag(scope.kind as u8);
        }
        for (_, sig) in self.signals.iter() {
            h.write_tag(2);
            h.write_str(interner.resolve(sig.name));
            h.write_tag(sig.kind as u8);
            h.write_tag(sig.port as u8);
            h.write_u64(sig.width() as u64);
            h.write_i64(sig.msb);
            h.write_i64(sig.lsb);
            h.write_tag(sig.local as u8);
        }
        for (_, mem) in self.memories.iter() {
            h.write_tag(3);
            h.write_str(interner.resolve(mem.name));
            h.write_u64(mem.width as u64);
            h.write_i64(mem.left_idx);
            h.write_i64(mem.right_idx);
        }
        for (name, value) in &self.parameters {
            h.write_tag(4);
            h.write_str(interner.resolve(*name));
            match value {
                NetExpr::Const(v) => h.write_str(&format!("{v}")),
                _ => h.write_str("<unresolved>"),
            }
        }
        for (_, node) in self.nodes.iter() {
            h.write_tag(5);
            h.write_str(interner.resolve(node.name));
            h.write_tag(node_kind_tag(&node.kind));
            h.write_u64(node.pin_count() as u64);
            for (k, v) in &node.attributes {
                h.write_str(k);
                h.write_str(v);
            }
        }
        for (_, top) in self.processes.iter() {
            h.write_tag(6);
            h.write_tag(top.kind as u8);
        }
        h.finish()
    }
}

fn node_kind_tag(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Logic { .. } => 0,
        NodeKind::Udp { .. } => 1,
        NodeKind::Const { .. } => 2,
        NodeKind::Assign { .. } => 3,
        NodeKind::AssignMem { .. } => 4,
        NodeKind::Event { .. } => 5,
        NodeKind::AddSub { .. } => 6,
        NodeKind::Compare { .. } => 7,
        NodeKind::Mux { .. } => 8,
        NodeKind::UFunc { .. } => 9,
        NodeKind::Ff { .. } => 10,
        NodeKind::RamDq { .. } => 11,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LogicOp;

    fn setup() -> (Design, Interner) {
        (Design::new(), Interner::new())
    }

    #[test]
    fn root_scope_registration() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        assert_eq!(des.root_scope(), Some(root));
        let path = interner.get_or_intern("top");
        assert_eq!(des.find_scope(path), Some(root));
    }

    #[test]
    fn duplicate_scope_rejected() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        assert!(des
            .make_scope(&interner, root, ScopeKind::Module, "u1")
            .is_some());
        assert!(des
            .make_scope(&interner, root, ScopeKind::Module, "u1")
            .is_none());
    }

    #[test]
    fn scope_paths_are_dotted() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let u1 = des
            .make_scope(&interner, root, ScopeKind::Module, "u1")
            .unwrap();
        assert_eq!(interner.resolve(des.scope_path(u1)), "top.u1");
    }

    #[test]
    fn local_symbols_are_monotonic() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let path = des.scope_path(root);
        let a = des.local_symbol(&interner, path);
        let b = des.local_symbol(&interner, path);
        assert_eq!(interner.resolve(a), "top._L0");
        assert_eq!(interner.resolve(b), "top._L1");
    }

    #[test]
    fn signal_lookup_walks_scope_chain() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let blk = des
            .make_scope(&interner, root, ScopeKind::BeginEnd, "blk")
            .unwrap();
        let name = interner.join(des.scope_path(root), "q");
        let id = des.add_signal(
            root,
            name,
            NetKind::Reg,
            PortClass::NotAPort,
            3,
            0,
            Logic::X,
            false,
            Span::DUMMY,
        );
        // visible from the inner scope
        assert_eq!(des.find_signal(&interner, des.scope_path(blk), "q"), Some(id));
        // and from its own scope
        assert_eq!(des.find_signal(&interner, des.scope_path(root), "q"), Some(id));
        assert_eq!(des.find_signal(&interner, des.scope_path(root), "nope"), None);
    }

    #[test]
    fn signal_pins_match_width() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let name = interner.join(des.scope_path(root), "bus");
        let id = des.add_signal(
            root,
            name,
            NetKind::Wire,
            PortClass::NotAPort,
            7,
            0,
            Logic::Z,
            false,
            Span::DUMMY,
        );
        assert_eq!(des.signals[id].width(), 8);
        assert_eq!(des.signals[id].init.len(), 8);
        for bit in 0..8 {
            let owner = des.links.owner(des.signals[id].pin(bit));
            assert_eq!(owner, PinOwner::Signal { net: id, bit });
        }
    }

    #[test]
    fn parameter_chain_lookup() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let blk = des
            .make_scope(&interner, root, ScopeKind::Module, "u1")
            .unwrap();
        let fq = interner.join(des.scope_path(root), "W");
        des.set_parameter(fq, NetExpr::Const(silica_common::LogicVec::from_u64(8, 32)));
        assert!(des
            .find_parameter(&interner, des.scope_path(blk), "W")
            .is_some());
    }

    #[test]
    fn node_deletion_releases_pins() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let path = des.scope_path(root);
        let name = des.local_symbol(&interner, path);
        let node = des.add_node(
            name,
            NodeKind::Logic {
                op: LogicOp::And,
                rise: 0,
                fall: 0,
                decay: 0,
            },
            3,
            Span::DUMMY,
        );
        let before = des.links.pin_count();
        des.delete_node(node);
        assert_eq!(des.links.pin_count(), before - 3);
        assert!(des.nodes.try_get(node).is_none());
    }

    #[test]
    fn nexus_name_prefers_nonlocal_multibit() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let path = des.scope_path(root);

        let bus_name = interner.join(path, "bus");
        let bus = des.add_signal(
            root,
            bus_name,
            NetKind::Wire,
            PortClass::NotAPort,
            3,
            0,
            Logic::Z,
            false,
            Span::DUMMY,
        );
        let tmp_name = interner.join(path, "_L0");
        let tmp = des.add_signal(
            root,
            tmp_name,
            NetKind::Wire,
            PortClass::NotAPort,
            0,
            0,
            Logic::Z,
            true,
            Span::DUMMY,
        );
        let a = des.signals[bus].pin(2);
        let b = des.signals[tmp].pin(0);
        des.links.connect(a, b);

        assert_eq!(des.nexus_name(&interner, a).unwrap(), "top.bus<2>");
        // every pin of the nexus resolves identically
        assert_eq!(des.nexus_name(&interner, b).unwrap(), "top.bus<2>");
    }

    #[test]
    fn nexus_name_breaks_ties_lexicographically() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let path = des.scope_path(root);
        let mk = |des: &mut Design, interner: &Interner, leaf: &str| {
            let name = interner.join(path, leaf);
            des.add_signal(
                root,
                name,
                NetKind::Wire,
                PortClass::NotAPort,
                0,
                0,
                Logic::Z,
                false,
                Span::DUMMY,
            )
        };
        let b = mk(&mut des, &interner, "beta");
        let a = mk(&mut des, &interner, "alpha");
        let pa = des.signals[a].pin(0);
        let pb = des.signals[b].pin(0);
        des.links.connect(pb, pa);
        assert_eq!(des.nexus_name(&interner, pb).unwrap(), "top.alpha");
    }

    #[test]
    fn nexus_name_without_signal_is_internal_error() {
        let (mut des, interner) = setup();
        let root = des.make_root_scope(&interner, "top");
        let path = des.scope_path(root);
        let name = des.local_symbol(&interner, path);
        let node = des.add_node(
            name,
            NodeKind::Logic {
                op: LogicOp::Buf,
                rise: 0,
                fall: 0,
                decay: 0,
            },
            2,
            Span::DUMMY,
        );
        let pin = des.nodes[node].pin(0);
        assert!(des.nexus_name(&interner, pin).is_err());
    }

    #[test]
    fn content_hash_is_deterministic() {
        let build = |interner: &Interner| {
            let mut des = Design::new();
            let root = des.make_root_scope(interner, "top");
            let path = des.scope_path(root);
            let name = interner.join(path, "q");
            des.add_signal(
                root,
                name,
                NetKind::Reg,
                PortClass::Output,
                3,
                0,
                Logic::X,
                false,
                Span::DUMMY,
            );
            des
        };
        let interner = Interner::new();
        let a = build(&interner);
        let b = build(&interner);
        assert_eq!(a.content_hash(&interner), b.content_hash(&interner));
    }

    #[test]
    fn content_hash_distinguishes_designs() {
        let interner = Interner::new();
        let mut a = Design::new();
        a.make_root_scope(&interner, "top");
        let mut b = Design::new();
        b.make_root_scope(&interner, "other");
        assert_ne!(a.content_hash(&interner), b.content_hash(&interner));
    }
}
