//! Memories (register arrays) in the elaborated design.

use serde::{Deserialize, Serialize};
use silica_common::Ident;
use silica_source::Span;

/// A memory: an array of words addressed by index.
///
/// Memory words have no pins; reads and writes go through procedural
/// assignments (and, after synthesis, RAM ports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetMemory {
    /// The fully qualified name.
    pub name: Ident,
    /// The bit width of one word.
    pub width: u32,
    /// The left (first) declared word index.
    pub left_idx: i64,
    /// The right (second) declared word index.
    pub right_idx: i64,
    /// Source location of the declaration.
    pub span: Span,
}

impl NetMemory {
    /// Returns the number of words in this memory.
    pub fn word_count(&self) -> u64 {
        (self.left_idx - self.right_idx).unsigned_abs() + 1
    }
}
