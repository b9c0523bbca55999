//! Behavioral-to-LPM synthesis.
//!
//! Searches the behavioral processes of an elaborated design for patterns
//! known to represent library components, and rewrites matches into
//! structural primitives. The interesting cases are the sequential ones:
//!
//! ```text
//! always @(posedge CLK) Q = D;
//! always @(negedge CLK) Q = D;
//! always @(posedge CLK) if (CE) Q = D;
//! always @(negedge CLK) if (CE) Q = D;
//! ```
//!
//! and the memory-write forms of the same four shapes. A matched process
//! is replaced by a [`NodeKind::Ff`] or [`NodeKind::RamDq`] node and
//! deleted; everything else is left untouched. `initial` processes are
//! never rewritten.

#![warn(missing_docs)]

mod dff;
mod expr_synth;

use silica_common::Interner;
use silica_netlist::{Design, ProcessKind};

/// Runs the synthesis functor over every process in the design.
pub fn synth(design: &mut Design, interner: &Interner) {
    let candidates: Vec<_> = design
        .processes
        .iter()
        .filter(|(_, top)| top.kind == ProcessKind::Always)
        .map(|(id, _)| id)
        .collect();

    for id in candidates {
        dff::try_rewrite(design, interner, id);
    }
}
