//! Parsed user-defined primitives.

use serde::{Deserialize, Serialize};
use silica_common::{Ident, Logic};
use silica_source::Span;
use std::collections::BTreeMap;

/// One row of a UDP truth table.
///
/// For sequential primitives, `current` holds the current-state character
/// that elaboration prepends to the input string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PUdpRow {
    /// The current output state, for sequential primitives.
    pub current: Option<char>,
    /// The input column characters, one per input port.
    pub inputs: String,
    /// The output column character.
    pub output: char,
}

/// A parsed user-defined primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PUdp {
    /// The primitive name.
    pub name: Ident,
    /// The port names; port 0 is the output.
    pub ports: Vec<Ident>,
    /// `true` for a sequential (stateful) primitive.
    pub sequential: bool,
    /// The truth-table rows.
    pub rows: Vec<PUdpRow>,
    /// The declared initial output state; only 0, 1, and x are
    /// representable in a UDP.
    pub initial: Logic,
    /// Source-level attributes.
    pub attributes: BTreeMap<String, String>,
    /// Source location.
    pub span: Span,
}

impl PUdp {
    /// Returns the number of ports, including the output.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}
