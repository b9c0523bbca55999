//! The pin connection graph.
//!
//! Every signal bit and node pin is a vertex in an undirected graph;
//! [`LinkGraph::connect`] adds an edge between two pins. A **nexus** is a
//! connected component of this graph: the set of pins that are
//! electrically one net. This replaces the classic doubly-linked pin-ring
//! representation with an arena of pins and plain graph traversal.

use crate::ids::{NetId, NodeId, PinId};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

/// The entity a pin belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinOwner {
    /// Bit `bit` of a signal.
    Signal {
        /// The owning signal.
        net: NetId,
        /// The bit index (0 = least significant).
        bit: u32,
    },
    /// Pin `pin` of a structural node.
    Node {
        /// The owning node.
        node: NodeId,
        /// The pin position within the node.
        pin: u32,
    },
}

/// The design-wide pin connection graph.
#[derive(Debug, Default)]
pub struct LinkGraph {
    graph: StableUnGraph<PinOwner, ()>,
}

impl LinkGraph {
    /// Creates a new empty link graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a pin owned by the given entity.
    pub fn alloc_pin(&mut self, owner: PinOwner) -> PinId {
        let idx = self.graph.add_node(owner);
        PinId::from_raw(idx.index() as u32)
    }

    /// Returns the owner of a pin.
    pub fn owner(&self, pin: PinId) -> PinOwner {
        self.graph[node_index(pin)]
    }

    /// Connects two pins, merging their nexuses.
    ///
    /// Connecting a pin to itself, or two already-connected pins, is a
    /// no-op.
    pub fn connect(&mut self, a: PinId, b: PinId) {
        let (na, nb) = (node_index(a), node_index(b));
        if na == nb || self.graph.contains_edge(na, nb) {
            return;
        }
        self.graph.add_edge(na, nb, ());
    }

    /// Returns `true` if the two pins are in the same nexus.
    pub fn is_connected(&self, a: PinId, b: PinId) -> bool {
        if a == b {
            return true;
        }
        let target = node_index(b);
        let mut bfs = Bfs::new(&self.graph, node_index(a));
        while let Some(n) = bfs.next(&self.graph) {
            if n == target {
                return true;
            }
        }
        false
    }

    /// Returns every pin in the nexus of `pin`, including `pin` itself,
    /// in ascending pin order.
    pub fn nexus(&self, pin: PinId) -> Vec<PinId> {
        let mut members = Vec::new();
        let mut bfs = Bfs::new(&self.graph, node_index(pin));
        while let Some(n) = bfs.next(&self.graph) {
            members.push(PinId::from_raw(n.index() as u32));
        }
        members.sort();
        members
    }

    /// Removes pins from the graph, disconnecting them from their nexuses.
    ///
    /// Used when a structural node is deleted; the other pins of its
    /// former nexuses are unaffected beyond losing the edges through the
    /// removed pins.
    pub fn release_pins(&mut self, pins: &[PinId]) {
        for &pin in pins {
            self.graph.remove_node(node_index(pin));
        }
    }

    /// Returns the number of live pins.
    pub fn pin_count(&self) -> usize {
        self.graph.node_count()
    }
}

fn node_index(pin: PinId) -> NodeIndex {
    NodeIndex::new(pin.as_raw() as usize)
}
