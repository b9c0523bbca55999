//! File-and-line source locations.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A source location: a file and a 1-based line number.
///
/// The parser attaches a `Span` to every node it produces; elaboration
/// copies spans into the netlist entities it creates so that every
/// diagnostic can name the line of source it came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this location belongs to.
    pub file: FileId,
    /// The 1-based line number.
    pub line: u32,
}

impl Span {
    /// A dummy span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        line: 0,
    };

    /// Creates a new span for the given file and line.
    pub fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}
